use latewarp_image::{NdImage, PaddingMode};

use super::{effective_shape, push_entry, Transform};
use crate::error::TransformError;
use crate::functional;

/// Crop and/or pad with signed per-axis index ranges.
///
/// A range `(start, end)` selects `[start, end)` along its axis;
/// regions outside the source are filled per the padding mode at flush
/// time. Ranges can be fixed at construction or supplied per call.
#[derive(Debug, Clone)]
pub struct CropPad {
    /// Per-axis index ranges; `None` requires call-time ranges.
    pub ranges: Option<Vec<(i64, i64)>>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`CropPad`].
#[derive(Debug, Clone, Default)]
pub struct CropPadOverrides {
    /// Replace the configured ranges.
    pub ranges: Option<Vec<(i64, i64)>>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl CropPad {
    /// Create a crop/pad with fixed ranges and border padding.
    pub fn new(ranges: Vec<(i64, i64)>) -> Self {
        Self {
            ranges: Some(ranges),
            padding_mode: Some(PaddingMode::Border),
            lazy: true,
        }
    }

    /// Queue the crop/pad with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &CropPadOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let ranges = match overrides.ranges.as_ref().or(self.ranges.as_ref()) {
            Some(r) => r,
            None => {
                return Err(TransformError::InvalidConfig {
                    op: "croppad",
                    reason: "no ranges configured or supplied".to_string(),
                })
            }
        };
        let (matrix, meta) = functional::croppad(&shape, ranges, self.padding_mode)?;
        push_entry(img, "croppad", matrix, meta, self.lazy)
    }
}

impl Transform for CropPad {
    fn name(&self) -> &'static str {
        "croppad"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &CropPadOverrides::default())
    }
}
