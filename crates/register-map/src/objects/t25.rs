use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

pub const T25: ObjectType = ObjectType {
    id: 25,
    name: "T25 Self Test",
    size: 15,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::byte("CMD", 1),
        F::word("UPSIGLIM0", 2),
        F::word("LOSIGLIM0", 4),
        F::word("UPSIGLIM1", 6),
        F::word("LOSIGLIM1", 8),
        F::byte("PINDWELLUS", 10),
        F::word("SIGRANGELIM0", 11),
        F::word("SIGRANGELIM1", 13),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
