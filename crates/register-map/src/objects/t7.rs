//! T7 GEN_POWERCONFIG: acquisition intervals and idle/active transitions.

use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

pub const T7: ObjectType = ObjectType {
    id: 7,
    name: "T7 General Power Config",
    size: 7,
    fields: &[
        F::byte("IDLEACQINT", 0),
        F::byte("ACTVACQINT", 1),
        F::byte("ACTV2IDLETO", 2),
        F::bits("IDLEPIPEEN", 3, 0, 0x01),
        F::bits("ACTVPIPEEN", 3, 1, 0x02),
        F::bits("ACTV2IDLETOMSB", 3, 2, 0x3C),
        F::bits("OVFRPTSUP", 3, 6, 0x40),
        F::bits("INITACTV", 3, 7, 0x80),
        F::bits("IGNSTATICTCH", 4, 0, 0x01),
        F::bits("DISPOWMON", 4, 1, 0x02),
        F::bits("POWMONMODE", 4, 2, 0x04),
        F::byte("IDLEACQINTFINE", 5),
        F::byte("ACTVACQINTFINE", 6),
    ],
    groups: &[BitGroup::new("CFG", 3), BitGroup::new("CFG2", 4)],
};
