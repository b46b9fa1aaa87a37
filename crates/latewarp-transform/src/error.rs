use latewarp_geometry::GeometryError;
use latewarp_image::ImageError;

use crate::resample::ResampleError;

/// An error type for the transform module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TransformError {
    /// Error from the image entity.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from matrix or extent math.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Error from the resampler, propagated unmodified.
    #[error(transparent)]
    Resample(#[from] ResampleError),

    /// Error when an operation is configured with malformed parameters.
    #[error("Invalid configuration for {op}: {reason}")]
    InvalidConfig {
        /// The operation that rejected its parameters.
        op: &'static str,
        /// Why the parameters were rejected.
        reason: String,
    },

    /// Error when inversion is requested from an operation without one.
    #[error("Inverse is not supported for {0}")]
    InverseNotSupported(&'static str),
}
