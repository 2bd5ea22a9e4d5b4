//! T100 TOUCH_MULTITOUCHSCREEN
//!
//! `CFG1` carries the sensor orientation bits used by [`crate::SensorOrientation`].

use crate::types::{BitGroup, FieldDescriptor as F, ObjectType};

pub const T100: ObjectType = ObjectType {
    id: 100,
    name: "T100 Multiple Touch Touchscreen",
    size: 54,
    fields: &[
        F::bits("ENABLE", 0, 0, 0x01),
        F::bits("RPTEN", 0, 1, 0x02),
        F::bits("DISSCRMSG0", 0, 2, 0x04),
        F::bits("SCANEN", 0, 7, 0x80),
        F::bits("SWITCHXY", 1, 5, 0x20),
        F::bits("INVERTY", 1, 6, 0x40),
        F::bits("INVERTX", 1, 7, 0x80),
        F::byte("SCRAUX", 2),
        F::byte("TCHAUX", 3),
        F::byte("TCHEVENTCFG", 4),
        F::byte("AKSCFG", 5),
        F::byte("NUMTCH", 6),
        F::byte("XYCFG", 7),
        F::byte("XORIGIN", 8),
        F::byte("XSIZE", 9),
        F::byte("XPITCH", 10),
        F::byte("XLOCLIP", 11),
        F::byte("XHICLIP", 12),
        F::word("XRANGE", 13),
        F::byte("XEDGECFG", 15),
        F::byte("XEDGEDIST", 16),
        F::byte("DXXEDGECFG", 17),
        F::byte("DXXEDGEDIST", 18),
        F::byte("YORIGIN", 19),
        F::byte("YSIZE", 20),
        F::byte("YPITCH", 21),
        F::byte("YLOCLIP", 22),
        F::byte("YHICLIP", 23),
        F::word("YRANGE", 24),
        F::byte("YEDGECFG", 26),
        F::byte("YEDGEDIST", 27),
        F::byte("GAIN", 28),
        F::byte("DXGAIN", 29),
        F::byte("TCHTHR", 30),
        F::byte("TCHHYST", 31),
        F::byte("INTTHR", 32),
        F::byte("NOISESF", 33),
        F::byte("CUTOFFTHR", 34),
        F::byte("MRGTHR", 35),
        F::byte("MRGTHRADJSTR", 36),
        F::byte("MRGHYST", 37),
        F::byte("DXTHRSF", 38),
        F::byte("TCHDIDOWN", 39),
        F::byte("TCHDIUP", 40),
        F::byte("NEXTTCHDI", 41),
        F::byte("CALCFG", 42),
        F::byte("JUMPLIMIT", 43),
        F::byte("MOVFILTER", 44),
        F::byte("MOVSMOOTH", 45),
        F::byte("MOVPRED", 46),
        F::word("MOVHYSTI", 47),
        F::word("MOVHYSTN", 49),
        F::byte("AMPLHYST", 51),
        F::byte("SCRAREAHYST", 52),
        F::byte("INTTHRHYST", 53),
    ],
    groups: &[BitGroup::new("CTRL", 0), BitGroup::new("CFG1", 1)],
};
