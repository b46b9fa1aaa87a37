#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the image module.
pub mod error;

/// image entity with its pending-operation queue.
pub mod image;

/// resample metadata record and its compatibility rules.
pub mod meta;

/// append-only queue of deferred operations.
pub mod queue;

pub use error::ImageError;
pub use image::NdImage;
pub use meta::{Device, Dtype, InterpMode, PaddingMode, ResampleMeta};
pub use queue::{PendingEntry, PendingQueue};
