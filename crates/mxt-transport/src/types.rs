use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Decoded object as delivered by a device: a JSON object of field name to integer.
pub type ObjectPayload = Value;

/// One named value inside an object's byte image.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub offset: u8,
    /// 1 or 2 bytes, little-endian
    pub width: u8,
}

impl PayloadField {
    pub fn new(name: impl Into<String>, offset: u8, width: u8) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
        }
    }
}

/// Ordered description of how an object's bytes map onto payload names.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayloadLayout {
    pub fields: Vec<PayloadField>,
}

impl PayloadLayout {
    pub fn new(fields: Vec<PayloadField>) -> Self {
        Self { fields }
    }

    /// Serialize a byte image into a named payload.
    ///
    /// Fields that lie past the end of `image` are left out.
    pub fn encode(&self, image: &[u8]) -> ObjectPayload {
        let mut out = Map::new();
        for f in &self.fields {
            let start = f.offset as usize;
            let end = start + f.width.max(1) as usize;
            if end > image.len() {
                continue;
            }
            let value = image[start..end]
                .iter()
                .rev()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
            out.insert(f.name.clone(), Value::from(value));
        }
        Value::Object(out)
    }
}

/// A write accepted by a backend, kept for inspection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteRecord {
    pub id: u8,
    pub offset: u8,
    pub data: Vec<u8>,
    pub at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_reads_little_endian_words() {
        let layout = PayloadLayout::new(vec![
            PayloadField::new("CTRL", 0, 1),
            PayloadField::new("XRANGE", 1, 2),
        ]);
        let payload = layout.encode(&[0x83, 0xFF, 0x03]);
        assert_eq!(payload, json!({ "CTRL": 0x83, "XRANGE": 1023 }));
    }

    #[test]
    fn encode_skips_fields_past_the_image() {
        let layout = PayloadLayout::new(vec![
            PayloadField::new("A", 0, 1),
            PayloadField::new("B", 4, 1),
        ]);
        assert_eq!(layout.encode(&[7, 0]), json!({ "A": 7 }));
    }
}
