use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("object T{0} not found")]
    ObjectNotFound(u8),
    #[error("attempt to write off the end of object T{object} (offset {offset}, len {len})")]
    OutOfBounds { object: u8, offset: u8, len: usize },
    #[error("I/O error: {0}")]
    Io(String),
}
