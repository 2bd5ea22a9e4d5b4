use mxt_transport::{PayloadField, PayloadLayout};
use serde::Serialize;

/// Where a field lives inside its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldLocation {
    /// Whole-byte field; `width` is 1 or 2 bytes, little-endian.
    Concrete { offset: u8, width: u8 },
    /// Sub-byte field sharing the byte at `offset` with its group siblings.
    Bitfield { offset: u8, shift: u8, mask: u8 },
    /// Reserved position. Not read, never written.
    Unmapped,
}

impl FieldLocation {
    pub fn is_readonly(&self) -> bool {
        matches!(self, FieldLocation::Unmapped)
    }

    pub fn offset(&self) -> Option<u8> {
        match *self {
            FieldLocation::Concrete { offset, .. } | FieldLocation::Bitfield { offset, .. } => {
                Some(offset)
            }
            FieldLocation::Unmapped => None,
        }
    }

    /// Largest value the field can hold.
    pub fn max_value(&self) -> i64 {
        match *self {
            FieldLocation::Concrete { width, .. } => (1i64 << (8 * i64::from(width.max(1)))) - 1,
            FieldLocation::Bitfield { shift, mask, .. } => i64::from(mask >> shift),
            FieldLocation::Unmapped => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub location: FieldLocation,
}

impl FieldDescriptor {
    pub const fn byte(name: &'static str, offset: u8) -> Self {
        Self {
            name,
            location: FieldLocation::Concrete { offset, width: 1 },
        }
    }

    pub const fn word(name: &'static str, offset: u8) -> Self {
        Self {
            name,
            location: FieldLocation::Concrete { offset, width: 2 },
        }
    }

    pub const fn bits(name: &'static str, offset: u8, shift: u8, mask: u8) -> Self {
        Self {
            name,
            location: FieldLocation::Bitfield {
                offset,
                shift,
                mask,
            },
        }
    }

    pub const fn reserved(name: &'static str) -> Self {
        Self {
            name,
            location: FieldLocation::Unmapped,
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.location.is_readonly()
    }
}

/// Names the byte that a set of sibling bitfields share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitGroup {
    pub name: &'static str,
    pub offset: u8,
}

impl BitGroup {
    pub const fn new(name: &'static str, offset: u8) -> Self {
        Self { name, offset }
    }
}

/// One configuration object type (T7, T8, ...).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ObjectType {
    pub id: u8,
    pub name: &'static str,
    /// Object size in bytes on the reference controller
    pub size: u8,
    pub fields: &'static [FieldDescriptor],
    pub groups: &'static [BitGroup],
}

impl ObjectType {
    /// Tree key of the object node, e.g. `t7`.
    pub fn key(&self) -> String {
        format!("t{}", self.id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&BitGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_at(&self, offset: u8) -> Option<&BitGroup> {
        self.groups.iter().find(|g| g.offset == offset)
    }

    /// Bitfields belonging to the group at `offset`, in table order.
    pub fn bitfields_at(&self, offset: u8) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields.iter().filter(move |f| {
            matches!(f.location, FieldLocation::Bitfield { offset: o, .. } if o == offset)
        })
    }

    /// Byte-level payload layout: whole fields plus one entry per bit group.
    pub fn payload_layout(&self) -> PayloadLayout {
        let mut fields: Vec<PayloadField> = Vec::new();
        for f in self.fields {
            match f.location {
                FieldLocation::Concrete { offset, width } => {
                    fields.push(PayloadField::new(f.name, offset, width));
                }
                FieldLocation::Bitfield { offset, .. } => {
                    if let Some(g) = self.group_at(offset) {
                        if !fields.iter().any(|p| p.name == g.name) {
                            fields.push(PayloadField::new(g.name, g.offset, 1));
                        }
                    }
                }
                FieldLocation::Unmapped => {}
            }
        }
        fields.sort_by_key(|p| p.offset);
        PayloadLayout::new(fields)
    }
}

/// Value of a bitfield within its parent byte.
pub fn extract_bits(byte: u8, shift: u8, mask: u8) -> u8 {
    (byte & mask) >> shift
}

/// Replace the bits under `mask` in `byte` with `value << shift`, keeping the rest.
pub fn merge_bits(byte: u8, shift: u8, mask: u8, value: u8) -> u8 {
    (byte & !mask) | ((value << shift) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_matches_shift_then_mask() {
        for byte in 0..=255u8 {
            assert_eq!(extract_bits(byte, 2, 0x3C), (byte >> 2) & (0x3C >> 2));
        }
    }

    #[test]
    fn merge_keeps_sibling_bits() {
        assert_eq!(merge_bits(0x00, 1, 0x02, 1), 0x02);
        assert_eq!(merge_bits(0x01, 1, 0x02, 1), 0x03);
        assert_eq!(merge_bits(0xFF, 2, 0x3C, 0), 0xC3);
        assert_eq!(merge_bits(0x81, 2, 0x3C, 0x0A), 0xA9);
    }

    #[test]
    fn readonly_is_derived_from_location() {
        assert!(FieldDescriptor::reserved("reserved").is_readonly());
        assert!(!FieldDescriptor::byte("CHRGTIME", 0).is_readonly());
        assert!(!FieldDescriptor::bits("ENABLE", 0, 0, 0x01).is_readonly());
    }

    #[test]
    fn max_value_follows_width_and_mask() {
        assert_eq!(FieldDescriptor::byte("A", 0).location.max_value(), 0xFF);
        assert_eq!(FieldDescriptor::word("B", 0).location.max_value(), 0xFFFF);
        assert_eq!(FieldDescriptor::bits("C", 0, 2, 0x3C).location.max_value(), 0x0F);
    }
}
