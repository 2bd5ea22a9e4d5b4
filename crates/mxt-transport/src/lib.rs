//! mxt-transport: device I/O abstractions for maXTouch configuration objects
//!
//! This crate defines the two operations the register map needs from a device
//! (read one object as a named payload, write bytes at an object offset) and the
//! types that describe an object's payload layout. The default build enables a
//! `mock` backend so that tools and tests run on any host without hardware.

mod types;
pub use types::{ObjectPayload, PayloadField, PayloadLayout, WriteRecord};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::DeviceIo;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockDevice;
