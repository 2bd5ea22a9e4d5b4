use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

/// T65 PROCI_LENSBENDING
pub const T65: ObjectType = ObjectType {
    id: 65,
    name: "T65 Lens Bending",
    size: 23,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::byte("GRADTHR", 1),
        F::word("YLONOISEMUL", 2),
        F::word("YLONOISEDIV", 4),
        F::word("YHINOISEMUL", 6),
        F::word("YHINOISEDIV", 8),
        F::byte("LPFILTCOEF", 10),
        F::word("FORCESCALE", 11),
        F::byte("FORCETHR", 13),
        F::byte("FORCETHRHYST", 14),
        F::byte("FORCEDI", 15),
        F::byte("FORCEHYST", 16),
        F::byte("ATCHRATIO", 17),
        F::reserved("reserved"),
        F::reserved("reserved2"),
        F::byte("EXFRCTHR", 20),
        F::byte("EXFRCTHRHYST", 21),
        F::byte("EXFRCTO", 22),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
