//! Deferred transform wrappers.
//!
//! Each wrapper holds construction-time defaults for one geometric
//! operation. A call resolves effective parameters (call-time overrides
//! beat the defaults), reads the queue's latest shape hint when an
//! earlier size-changing operation has not materialized yet, computes
//! the matrix increment and metadata through [`crate::functional`], and
//! pushes one [`PendingEntry`]. Wrappers configured with `lazy = false`
//! run the apply engine immediately after the push, which is the same
//! code path as a single-entry deferred flush.

mod croppad;
mod random;
mod spatial;

pub use croppad::{CropPad, CropPadOverrides};
pub use random::{
    symmetric_range, RandFlip, RandFlipParams, RandRotate, RandRotate90, RandRotate90Params,
    RandRotateParams,
};
pub use spatial::{
    Flip, FlipOverrides, Resize, ResizeOverrides, Rotate, Rotate90, Rotate90Overrides,
    RotateOverrides, Spacing, SpacingOverrides, Translate, TranslateOverrides, Zoom, ZoomOverrides,
};

use latewarp_geometry::AffineMatrix;
use latewarp_image::{NdImage, PendingEntry, ResampleMeta};

use crate::apply::apply_pending;
use crate::error::TransformError;
use crate::resample::AffineResampler;

/// A geometric operation that queues itself on an image.
pub trait Transform {
    /// Short operation name used in error conditions.
    fn name(&self) -> &'static str;

    /// Queue the operation, materializing immediately when not lazy.
    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError>;

    /// Apply the inverse of the operation.
    ///
    /// Operations without a defined inverse fail explicitly rather than
    /// producing an approximation.
    fn inverse(&mut self, _img: NdImage) -> Result<NdImage, TransformError> {
        Err(TransformError::InverseNotSupported(self.name()))
    }
}

/// The shape the next queued operation builds against: an explicit
/// override first, then the queue's latest shape hint, then the image
/// shape itself.
fn effective_shape(img: &NdImage, shape_override: &Option<Vec<usize>>) -> Vec<usize> {
    if let Some(shape) = shape_override {
        return shape.clone();
    }
    if let Some(hint) = img
        .peek_pending()
        .and_then(|e| e.meta.shape_override.clone())
    {
        return hint;
    }
    img.shape().to_vec()
}

/// Push one computed increment, then run the engine unless deferred.
fn push_entry(
    mut img: NdImage,
    op: &'static str,
    matrix: AffineMatrix,
    meta: ResampleMeta,
    lazy: bool,
) -> Result<NdImage, TransformError> {
    log::trace!("queueing {op} increment ({} pending)", img.pending().len() + 1);
    img.push_pending(PendingEntry { matrix, meta });
    if lazy {
        Ok(img)
    } else {
        apply_pending(img, &AffineResampler)
    }
}
