//! The boundary between the composition engine and interpolation
//! numerics.
//!
//! The engine hands a resampler one composed affine matrix per maximal
//! compatible run of operations; everything about how samples are
//! produced — interpolation, padding, precision — lives behind the
//! [`Resample`] trait. [`AffineResampler`] is the CPU reference
//! implementation for 2-D and 3-D images.

mod cpu;

pub use cpu::AffineResampler;

use latewarp_geometry::{AffineMatrix, GeometryError};
use latewarp_image::{Device, Dtype, ImageError, InterpMode, NdImage, PaddingMode};

/// An error type for resampling.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResampleError {
    /// Error when the resampler cannot run on the requested device.
    #[error("Device {0:?} is not supported by this resampler")]
    UnsupportedDevice(Device),

    /// Error when the spatial rank has no interpolation kernel.
    #[error("Resampling is only implemented for spatial ranks 2 and 3, got {0}")]
    UnsupportedDimension(usize),

    /// Error when the target shape disagrees with the image rank.
    #[error("Target shape has {actual} axes but the image has {expected}")]
    TargetShapeMismatch {
        /// Axis count of the image.
        expected: usize,
        /// Axis count of the requested target shape.
        actual: usize,
    },

    /// Error when the target shape changes the channel count.
    #[error("Target shape has {actual} channels but the image has {expected}")]
    ChannelMismatch {
        /// Channel count of the image.
        expected: usize,
        /// Channel count of the requested target shape.
        actual: usize,
    },

    /// Error from matrix math during inverse mapping.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Error from building the output image.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Optional parameters for one resample pass.
///
/// Omitted fields use resampler-internal defaults: linear
/// interpolation, border padding, CPU device, single precision, and an
/// output shape derived from the transformed bounding box.
#[derive(Debug, Clone, Default)]
pub struct ResampleParams {
    /// Interpolation mode.
    pub mode: Option<InterpMode>,
    /// Padding mode for out-of-bounds samples.
    pub padding_mode: Option<PaddingMode>,
    /// Device to run on.
    pub device: Option<Device>,
    /// Computation precision.
    pub dtype: Option<Dtype>,
    /// Output shape as `[channels, spatial...]`.
    pub target_shape: Option<Vec<usize>>,
}

/// A single-matrix interpolation pass over an image.
pub trait Resample {
    /// Apply one affine matrix to the image in a single interpolation
    /// pass.
    ///
    /// The matrix maps source index coordinates to output index
    /// coordinates; implementations invert it and sample the source
    /// once per output element. Callers are responsible for a matrix
    /// whose image of the source box lands inside the target shape.
    fn resample(
        &self,
        img: &NdImage,
        matrix: &AffineMatrix,
        params: &ResampleParams,
    ) -> Result<NdImage, ResampleError>;
}
