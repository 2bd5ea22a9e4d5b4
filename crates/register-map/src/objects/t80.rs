use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

/// T80 PROCG_RETRANSMISSIONCOMPENSATION
pub const T80: ObjectType = ObjectType {
    id: 80,
    name: "T80 Retransmission Compensation",
    size: 14,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::byte("COMPGAIN", 1),
        F::byte("TARGETDELTA", 2),
        F::byte("COMPTHR", 3),
        F::byte("ATCHTHR", 4),
        F::byte("MOISTCFG", 5),
        F::reserved("reserved"),
        F::byte("MOISTTHR", 7),
        F::byte("MOISTINVTCHTHR", 8),
        F::byte("MOISTCFG2", 9),
        F::byte("MOISTINVTCHTHRSF", 10),
        F::reserved("reserved2"),
        F::byte("MOISTCFG3", 12),
        F::byte("MOISTDEGTHR", 13),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
