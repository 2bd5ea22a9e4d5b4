use crate::types::{FieldDescriptor as F, ObjectType};

/// T46 SPT_CTECONFIG
pub const T46: ObjectType = ObjectType {
    id: 46,
    name: "T46 CTE Config",
    size: 11,
    fields: &[
        F::byte("CTRL", 0),
        F::reserved("reserved"),
        F::byte("IDLESYNCSPERX", 2),
        F::byte("ACTVSYNCSPERX", 3),
        F::byte("ADCSPERSYNC", 4),
        F::byte("PULSESPERADC", 5),
        F::byte("XSLEW", 6),
        F::word("SYNCDELAY", 7),
        F::byte("XVOFFSET", 9),
        F::byte("INRUSHCFG", 10),
    ],
    groups: &[],
};
