//! T56 PROCI_SHIELDLESS
//!
//! The object length depends on the number of X lines; the table covers the
//! 1066 layout and shorter images are zero-padded before decoding.

use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

pub const T56: ObjectType = ObjectType {
    id: 56,
    name: "T56 Shieldless",
    size: 28,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::reserved("reserved"),
        F::byte("OPTINT", 2),
        F::byte("INTTIME", 3),
        F::byte("INTDELAY0", 4),
        F::byte("INTDELAY1", 5),
        F::byte("INTDELAY2", 6),
        F::byte("INTDELAY3", 7),
        F::byte("INTDELAY4", 8),
        F::byte("INTDELAY5", 9),
        F::byte("INTDELAY6", 10),
        F::byte("INTDELAY7", 11),
        F::byte("INTDELAY8", 12),
        F::byte("INTDELAY9", 13),
        F::byte("INTDELAY10", 14),
        F::byte("INTDELAY11", 15),
        F::byte("INTDELAY12", 16),
        F::byte("INTDELAY13", 17),
        F::byte("INTDELAY14", 18),
        F::byte("INTDELAY15", 19),
        F::byte("MULTICUTGC", 20),
        F::byte("GCLIMIT", 21),
        F::byte("NCNCL", 22),
        F::byte("TOUCHBIAS", 23),
        F::byte("BASESCALE", 24),
        F::byte("SHIFTLIMIT", 25),
        F::word("YLONOISEMUL", 26),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
