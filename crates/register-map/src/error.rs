use mxt_transport::TransportError;
use thiserror::Error;

pub type Result<T, E = RegisterError> = core::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("object T{0} is not in the register map")]
    UnknownObject(u8),
    #[error("T{object} has no field named {field}")]
    UnknownField { object: u8, field: String },
    #[error("T{object}.{field} is reserved and cannot be written")]
    ReadOnlyField { object: u8, field: String },
    #[error("value {value} does not fit T{object}.{field} (max {max})")]
    ValueOutOfRange {
        object: u8,
        field: String,
        value: i64,
        max: i64,
    },
    #[error("reading T{object} failed: {source}")]
    Read {
        object: u8,
        #[source]
        source: TransportError,
    },
    #[error("writing T{object} at offset {offset} failed: {source}")]
    Write {
        object: u8,
        offset: u8,
        #[source]
        source: TransportError,
    },
    #[error("T{object} byte {offset} has not been read from the device")]
    UnreadByte { object: u8, offset: u8 },
    #[error("T{object} payload could not be decoded: {reason}")]
    Decode { object: u8, reason: String },
    #[error(transparent)]
    Layout(#[from] crate::validate::LayoutError),
}
