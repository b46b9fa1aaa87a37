#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// the apply engine: queue walking, matrix merging, flush policy.
pub mod apply;

/// pluggable caching collaborator.
pub mod cache;

/// error types for the transform module.
pub mod error;

/// pure per-operation matrix and metadata builders.
pub mod functional;

/// multi-sample fan-out collaborator.
pub mod multisample;

/// resampler boundary and the CPU reference implementation.
pub mod resample;

/// deferred transform wrappers.
pub mod transforms;

pub use apply::apply_pending;
pub use cache::{CacheMechanism, CachedTransform, MemoryCache};
pub use error::TransformError;
pub use multisample::MultiSampleTransform;
pub use resample::{AffineResampler, Resample, ResampleError, ResampleParams};
pub use transforms::Transform;
