use crate::{ObjectPayload, Result};
use async_trait::async_trait;

/// Device access used by the register map.
///
/// Implementations resolve each call once the underlying transfer settles.
/// Nothing here retries; callers decide what to do with a failure.
#[async_trait]
pub trait DeviceIo: Send + Sync {
    /// Read one configuration object and return it as a JSON object mapping
    /// field name to integer value.
    async fn read_object(&self, id: u8) -> Result<ObjectPayload>;

    /// Write `data` starting at `offset` bytes into object `id`.
    async fn write_register(&self, id: u8, offset: u8, data: &[u8]) -> Result<()>;
}
