use crate::error::{RegisterError, Result};
use crate::types::{merge_bits, BitGroup, FieldDescriptor, FieldLocation, ObjectType};

/// What an edit addresses inside an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget<'a> {
    Field(&'a FieldDescriptor),
    /// A whole parent byte, written as-is
    Group(&'a BitGroup),
}

impl EditTarget<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            EditTarget::Field(f) => f.name,
            EditTarget::Group(g) => g.name,
        }
    }

    /// Byte offset the write starts at. `None` for reserved fields.
    pub fn offset(&self) -> Option<u8> {
        match self {
            EditTarget::Field(f) => f.location.offset(),
            EditTarget::Group(g) => Some(g.offset),
        }
    }

    pub fn max_value(&self) -> i64 {
        match self {
            EditTarget::Field(f) => f.location.max_value(),
            EditTarget::Group(_) => 0xFF,
        }
    }

    /// True when the write has to be merged into a byte shared with siblings.
    pub fn is_bitfield(&self) -> bool {
        matches!(
            self,
            EditTarget::Field(FieldDescriptor {
                location: FieldLocation::Bitfield { .. },
                ..
            })
        )
    }
}

/// Bytes to send for one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub offset: u8,
    pub data: Vec<u8>,
}

/// Resolve a field or group name and reject edits that can never be written.
pub fn resolve<'a>(ty: &'a ObjectType, name: &str) -> Result<EditTarget<'a>> {
    let target = match (ty.field(name), ty.group(name)) {
        (Some(f), _) => EditTarget::Field(f),
        (None, Some(g)) => EditTarget::Group(g),
        (None, None) => {
            return Err(RegisterError::UnknownField {
                object: ty.id,
                field: name.to_string(),
            })
        }
    };
    if let EditTarget::Field(f) = target {
        if f.is_readonly() {
            return Err(RegisterError::ReadOnlyField {
                object: ty.id,
                field: name.to_string(),
            });
        }
    }
    Ok(target)
}

pub fn check_range(ty: &ObjectType, target: &EditTarget<'_>, value: i64) -> Result<()> {
    let max = target.max_value();
    if !(0..=max).contains(&value) {
        return Err(RegisterError::ValueOutOfRange {
            object: ty.id,
            field: target.name().to_string(),
            value,
            max,
        });
    }
    Ok(())
}

/// Compute the write for `value`.
///
/// Bitfields are merged into `cached`, the parent byte as last confirmed by
/// the device; siblings keep their bits. Whole fields are little-endian.
pub fn plan_write(
    ty: &ObjectType,
    target: &EditTarget<'_>,
    value: i64,
    cached: Option<u8>,
) -> Result<WritePlan> {
    check_range(ty, target, value)?;
    match *target {
        EditTarget::Group(g) => Ok(WritePlan {
            offset: g.offset,
            data: vec![value as u8],
        }),
        EditTarget::Field(f) => match f.location {
            FieldLocation::Concrete { offset, width } => {
                let bytes = (value as u16).to_le_bytes();
                Ok(WritePlan {
                    offset,
                    data: bytes[..usize::from(width.clamp(1, 2))].to_vec(),
                })
            }
            FieldLocation::Bitfield {
                offset,
                shift,
                mask,
            } => {
                let byte = cached.ok_or(RegisterError::UnreadByte {
                    object: ty.id,
                    offset,
                })?;
                Ok(WritePlan {
                    offset,
                    data: vec![merge_bits(byte, shift, mask, value as u8)],
                })
            }
            FieldLocation::Unmapped => Err(RegisterError::ReadOnlyField {
                object: ty.id,
                field: f.name.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{build, raw_fields_from_payload};
    use crate::objects::{T100, T7, T8};
    use serde_json::json;

    fn plan(ty: &ObjectType, name: &str, value: i64, cached: Option<u8>) -> Result<WritePlan> {
        let target = resolve(ty, name)?;
        plan_write(ty, &target, value, cached)
    }

    #[test]
    fn bitfield_is_merged_into_cached_byte() {
        let p = plan(&T7, "ACTVPIPEEN", 1, Some(0x00)).unwrap();
        assert_eq!(p, WritePlan { offset: 3, data: vec![0x02] });
        let p = plan(&T7, "ACTV2IDLETOMSB", 0x0F, Some(0x83)).unwrap();
        assert_eq!(p.data, vec![0xBF]);
    }

    #[test]
    fn decoded_cfg_reencodes_to_the_same_byte() {
        let raw = raw_fields_from_payload(7, &json!({ "CFG": 0x03 })).unwrap();
        let node = build(&T7, &raw).unwrap().node;
        let cfg = node.field("CFG").unwrap();
        let byte = cfg.children.iter().fold(0u8, |acc, child| {
            let p = plan(&T7, &child.name, child.value.unwrap(), Some(acc)).unwrap();
            p.data[0]
        });
        assert_eq!(byte, 0x03);
    }

    #[test]
    fn words_are_little_endian() {
        let p = plan(&T100, "XRANGE", 0x0FFF, None).unwrap();
        assert_eq!(p, WritePlan { offset: 13, data: vec![0xFF, 0x0F] });
    }

    #[test]
    fn group_name_writes_whole_byte() {
        let p = plan(&T7, "CFG", 0xA5, None).unwrap();
        assert_eq!(p, WritePlan { offset: 3, data: vec![0xA5] });
    }

    #[test]
    fn reserved_and_unknown_names_are_rejected() {
        assert!(matches!(
            resolve(&T8, "reserved"),
            Err(RegisterError::ReadOnlyField { object: 8, .. })
        ));
        assert!(matches!(
            resolve(&T8, "reserved2"),
            Err(RegisterError::ReadOnlyField { .. })
        ));
        assert!(matches!(
            resolve(&T8, "NOPE"),
            Err(RegisterError::UnknownField { .. })
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            plan(&T7, "ACTVPIPEEN", 2, Some(0)),
            Err(RegisterError::ValueOutOfRange { max: 1, .. })
        ));
        assert!(plan(&T7, "IDLEACQINT", 256, None).is_err());
        assert!(plan(&T7, "IDLEACQINT", -1, None).is_err());
    }

    #[test]
    fn bitfield_without_cached_byte_is_refused() {
        assert_eq!(
            plan(&T7, "ACTVPIPEEN", 1, None),
            Err(RegisterError::UnreadByte { object: 7, offset: 3 })
        );
    }
}
