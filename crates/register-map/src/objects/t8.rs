//! T8 GEN_ACQUISITIONCONFIG

use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

pub const T8: ObjectType = ObjectType {
    id: 8,
    name: "T8 Acquisition Config",
    size: 15,
    fields: &[
        F::byte("CHRGTIME", 0),
        // byte 1 (ATCHDRIFT on older firmware)
        F::reserved("reserved"),
        F::byte("TCHDRIFT", 2),
        F::byte("DRIFTST", 3),
        F::byte("TCHAUTOCAL", 4),
        // byte 5 (SYNC on older firmware)
        F::reserved("reserved2"),
        F::byte("ATCHCALST", 6),
        F::byte("ATCHCALSTHR", 7),
        F::byte("ATCHFRCCALTHR", 8),
        F::byte("ATCHFRCCALRATIO", 9),
        F::bits("MUTUALTCH", 10, 0, 0x01),
        F::bits("SELFTCH", 10, 1, 0x02),
        F::bits("SELFPROX", 10, 2, 0x04),
        F::byte("MEASIDLEDEF", 11),
        F::byte("MEASACTVDEF", 12),
        F::byte("REFMODE", 13),
        F::byte("CFG", 14),
    ],
    groups: &[BitGroup::new("MEASALLOW", 10)],
};
