use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

/// T47 PROCI_STYLUS: passive stylus detection.
pub const T47: ObjectType = ObjectType {
    id: 47,
    name: "T47 Stylus",
    size: 22,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::bits("SUPSTY", 0, 2, 0x04),
        F::byte("CONTMIN", 1),
        F::byte("CONTMAX", 2),
        F::byte("STABILITY", 3),
        F::byte("MAXTCHAREA", 4),
        F::byte("AMPLTHR", 5),
        F::byte("STYSHAPE", 6),
        F::byte("HOVERSUP", 7),
        F::byte("CONFTHR", 8),
        F::byte("SYNCSPERX", 9),
        F::byte("XPOSADJ", 10),
        F::byte("YPOSADJ", 11),
        F::byte("CFG", 12),
        F::reserved("reserved"),
        F::byte("SUPSTO", 14),
        F::byte("MAXNUMSTY", 15),
        F::byte("XEDGECTRL", 16),
        F::byte("XEDGEDIST", 17),
        F::byte("YEDGECTRL", 18),
        F::byte("YEDGEDIST", 19),
        F::byte("SUPTO", 20),
        F::byte("SUPCLASSMODE", 21),
    ],
    groups: &[BitGroup::new("CTRL", 0)],
};
