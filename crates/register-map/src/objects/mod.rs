//! Descriptor tables for the supported configuration objects.
//!
//! Each table is hand-curated from the controller's published memory map.
//! Table order is presentation order.

mod t100;
mod t25;
mod t42;
mod t46;
mod t47;
mod t56;
mod t65;
mod t7;
mod t8;
mod t80;

pub use t100::T100;
pub use t25::T25;
pub use t42::T42;
pub use t46::T46;
pub use t47::T47;
pub use t56::T56;
pub use t65::T65;
pub use t7::T7;
pub use t8::T8;
pub use t80::T80;

use crate::types::{FieldDescriptor, ObjectType};

/// Every object the register map knows, in catalog order.
pub static CATALOG: &[&ObjectType] = &[&T7, &T8, &T25, &T42, &T46, &T47, &T56, &T65, &T80, &T100];

pub fn object_type(id: u8) -> Option<&'static ObjectType> {
    CATALOG.iter().copied().find(|t| t.id == id)
}

/// Field descriptors for `id` in table order; empty for unknown objects.
pub fn descriptors_for(id: u8) -> &'static [FieldDescriptor] {
    object_type(id).map(|t| t.fields).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_the_ten_supported_objects() {
        let ids: Vec<u8> = CATALOG.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![7, 8, 25, 42, 46, 47, 56, 65, 80, 100]);
    }

    #[test]
    fn descriptors_keep_table_order() {
        let names: Vec<&str> = descriptors_for(7).iter().map(|f| f.name).collect();
        assert_eq!(&names[..4], &["IDLEACQINT", "ACTVACQINT", "ACTV2IDLETO", "IDLEPIPEEN"]);
        assert!(descriptors_for(6).is_empty());
    }

    #[test]
    fn t8_reserved_fields_are_unmapped() {
        for name in ["reserved", "reserved2"] {
            let f = T8.field(name).map(|f| f.is_readonly());
            assert_eq!(f, Some(true), "{name}");
        }
    }

    #[test]
    fn payload_layout_carries_groups_not_bits() {
        let names: Vec<String> = T7
            .payload_layout()
            .fields
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "IDLEACQINT",
                "ACTVACQINT",
                "ACTV2IDLETO",
                "CFG",
                "CFG2",
                "IDLEACQINTFINE",
                "ACTVACQINTFINE"
            ]
        );
    }
}
