use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

/// T42 PROCI_TOUCHSUPPRESSION: large-object and approach suppression.
pub const T42: ObjectType = ObjectType {
    id: 42,
    name: "T42 Touch Suppression",
    size: 13,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::bits("SHAPEEN", 0, 3, 0x08),
        F::bits("DISTEN", 0, 4, 0x10),
        F::byte("APPRTHR", 1),
        F::byte("MAXAPPRAREA", 2),
        F::byte("MAXTCHAREA", 3),
        F::byte("SUPSTRENGTH", 4),
        F::byte("SUPEXTTO", 5),
        F::byte("MAXNUMTCHS", 6),
        F::byte("SHAPESTRENGTH", 7),
        F::byte("SUPDIST", 8),
        F::byte("DISTHYST", 9),
        F::byte("MAXSCRNAREA", 10),
        F::byte("CFG", 11),
        F::byte("EDGESUPSTRENGTH", 12),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
