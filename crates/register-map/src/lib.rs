//! register-map: field model and device synchronization for maXTouch configuration objects
//!
//! Descriptor tables describe where every field of the supported objects
//! lives. A [`RegisterStore`] reads all objects through a [`DeviceIo`]
//! backend, builds a [`Snapshot`] of field trees and turns field edits back
//! into byte writes, merging bitfields into their shared byte.
//!
//! [`DeviceIo`]: mxt_transport::DeviceIo

mod types;
pub use types::*;

pub mod objects;
pub use objects::{descriptors_for, object_type, CATALOG};

mod validate;
pub use validate::{validate, validate_catalog, LayoutError};

mod error;
pub use error::{RegisterError, Result};

mod snapshot;
pub use snapshot::{NodeStatus, ObjectNode, ObjectStatus, RegisterNode, SensorOrientation, Snapshot};

mod decode;
pub use decode::{build, raw_fields_from_payload, BuildOutput, RawFields};

mod encode;
pub use encode::{plan_write, resolve, EditTarget, WritePlan};

mod diag;
pub use diag::{Diagnostic, DiagnosticKind};

mod metrics;
pub use metrics::{MetricsHub, RegisterMetrics};

mod loader;
pub use loader::{load_device_image, load_device_images_dir, DeviceImage, ImageObject};

mod store;
pub use store::RegisterStore;

mod sync;
pub use sync::EditOutcome;
