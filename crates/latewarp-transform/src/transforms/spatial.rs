use latewarp_image::{Dtype, InterpMode, NdImage, PaddingMode};

use super::{effective_shape, push_entry, Transform};
use crate::error::TransformError;
use crate::functional::{self, SizeMode};

/// Rotation by Euler angles about the image center.
///
/// Defaults to keeping the input shape, linear interpolation, border
/// padding, single precision, and deferred evaluation.
#[derive(Debug, Clone)]
pub struct Rotate {
    /// Rotation angles in radians: one for 2-D images, three for 3-D.
    pub angles: Vec<f64>,
    /// Keep the input shape instead of growing to the rotated bounds.
    pub keep_size: bool,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Rotate`].
#[derive(Debug, Clone, Default)]
pub struct RotateOverrides {
    /// Replace the configured angles.
    pub angles: Option<Vec<f64>>,
    /// Replace the configured interpolation mode.
    pub mode: Option<InterpMode>,
    /// Replace the configured padding mode.
    pub padding_mode: Option<PaddingMode>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Rotate {
    /// Create a rotation with default resample parameters.
    pub fn new(angles: Vec<f64>) -> Self {
        Self {
            angles,
            keep_size: true,
            mode: Some(InterpMode::Linear),
            padding_mode: Some(PaddingMode::Border),
            dtype: Some(Dtype::F32),
            lazy: true,
        }
    }

    /// Queue the rotation with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &RotateOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let angles = overrides.angles.as_deref().unwrap_or(&self.angles);
        let (matrix, meta) = functional::rotate(
            &shape,
            angles,
            self.keep_size,
            overrides.mode.or(self.mode),
            overrides.padding_mode.or(self.padding_mode),
            self.dtype,
        )?;
        push_entry(img, "rotate", matrix, meta, self.lazy)
    }
}

impl Transform for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &RotateOverrides::default())
    }
}

/// Zoom in or out about the image center.
///
/// A single factor applies to every spatial axis; a factor per axis
/// zooms anisotropically.
#[derive(Debug, Clone)]
pub struct Zoom {
    /// Zoom factors, one or one-per-axis.
    pub factors: Vec<f64>,
    /// Keep the input shape instead of scaling it.
    pub keep_size: bool,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Zoom`].
#[derive(Debug, Clone, Default)]
pub struct ZoomOverrides {
    /// Replace the configured factors.
    pub factors: Option<Vec<f64>>,
    /// Replace the configured interpolation mode.
    pub mode: Option<InterpMode>,
    /// Replace the configured padding mode.
    pub padding_mode: Option<PaddingMode>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Zoom {
    /// Create a zoom with default resample parameters.
    pub fn new(factors: Vec<f64>) -> Self {
        Self {
            factors,
            keep_size: true,
            mode: Some(InterpMode::Linear),
            padding_mode: Some(PaddingMode::Border),
            dtype: Some(Dtype::F32),
            lazy: true,
        }
    }

    /// Queue the zoom with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &ZoomOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let dims = shape.len() - 1;
        let configured = overrides.factors.as_deref().unwrap_or(&self.factors);
        let factors = if configured.len() == 1 && dims > 1 {
            vec![configured[0]; dims]
        } else {
            configured.to_vec()
        };
        let (matrix, meta) = functional::zoom(
            &shape,
            &factors,
            self.keep_size,
            overrides.mode.or(self.mode),
            overrides.padding_mode.or(self.padding_mode),
            self.dtype,
        )?;
        push_entry(img, "zoom", matrix, meta, self.lazy)
    }
}

impl Transform for Zoom {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &ZoomOverrides::default())
    }
}

/// Mirror the image along chosen spatial axes.
#[derive(Debug, Clone)]
pub struct Flip {
    /// Spatial axes to mirror.
    pub axes: Vec<usize>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Flip`].
#[derive(Debug, Clone, Default)]
pub struct FlipOverrides {
    /// Replace the configured axes.
    pub axes: Option<Vec<usize>>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Flip {
    /// Create a flip over the given spatial axes.
    pub fn new(axes: Vec<usize>) -> Self {
        Self { axes, lazy: true }
    }

    /// Queue the flip with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &FlipOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let axes = overrides.axes.as_deref().unwrap_or(&self.axes);
        let (matrix, meta) = functional::flip(&shape, axes)?;
        push_entry(img, "flip", matrix, meta, self.lazy)
    }
}

impl Transform for Flip {
    fn name(&self) -> &'static str {
        "flip"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &FlipOverrides::default())
    }
}

/// Scale the image to an explicit spatial size.
#[derive(Debug, Clone)]
pub struct Resize {
    /// Target spatial sizes, or one size for the longest axis.
    pub target: Vec<usize>,
    /// How the target is interpreted.
    pub size_mode: SizeMode,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Resize`].
#[derive(Debug, Clone, Default)]
pub struct ResizeOverrides {
    /// Replace the configured interpolation mode.
    pub mode: Option<InterpMode>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Resize {
    /// Create a resize to explicit per-axis sizes.
    pub fn new(target: Vec<usize>) -> Self {
        Self {
            target,
            size_mode: SizeMode::All,
            mode: Some(InterpMode::Linear),
            dtype: Some(Dtype::F32),
            lazy: true,
        }
    }

    /// Queue the resize with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &ResizeOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let (matrix, meta) = functional::resize(
            &shape,
            &self.target,
            self.size_mode,
            overrides.mode.or(self.mode),
            self.dtype,
        )?;
        push_entry(img, "resize", matrix, meta, self.lazy)
    }
}

impl Transform for Resize {
    fn name(&self) -> &'static str {
        "resize"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &ResizeOverrides::default())
    }
}

/// Shift image contents on a fixed canvas.
#[derive(Debug, Clone)]
pub struct Translate {
    /// Per-axis offsets in index units.
    pub offsets: Vec<f64>,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Translate`].
#[derive(Debug, Clone, Default)]
pub struct TranslateOverrides {
    /// Replace the configured offsets.
    pub offsets: Option<Vec<f64>>,
    /// Replace the configured interpolation mode.
    pub mode: Option<InterpMode>,
    /// Replace the configured padding mode.
    pub padding_mode: Option<PaddingMode>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Translate {
    /// Create a translation by per-axis offsets.
    pub fn new(offsets: Vec<f64>) -> Self {
        Self {
            offsets,
            mode: Some(InterpMode::Linear),
            padding_mode: Some(PaddingMode::Border),
            dtype: Some(Dtype::F32),
            lazy: true,
        }
    }

    /// Queue the translation with call-time overrides.
    pub fn call(
        &self,
        img: NdImage,
        overrides: &TranslateOverrides,
    ) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let offsets = overrides.offsets.as_deref().unwrap_or(&self.offsets);
        let (matrix, meta) = functional::translate(
            &shape,
            offsets,
            overrides.mode.or(self.mode),
            overrides.padding_mode.or(self.padding_mode),
            self.dtype,
        )?;
        push_entry(img, "translate", matrix, meta, self.lazy)
    }
}

impl Transform for Translate {
    fn name(&self) -> &'static str {
        "translate"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &TranslateOverrides::default())
    }
}

/// Resample to a new voxel spacing.
#[derive(Debug, Clone)]
pub struct Spacing {
    /// Target spacing per spatial axis, or one value for all.
    pub pixdim: Vec<f64>,
    /// Source spacing per spatial axis, or one value for all.
    pub src_pixdim: Vec<f64>,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Spacing`].
#[derive(Debug, Clone, Default)]
pub struct SpacingOverrides {
    /// Replace the configured interpolation mode.
    pub mode: Option<InterpMode>,
    /// Replace the configured padding mode.
    pub padding_mode: Option<PaddingMode>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Spacing {
    /// Create a spacing resample from source to target spacings.
    pub fn new(pixdim: Vec<f64>, src_pixdim: Vec<f64>) -> Self {
        Self {
            pixdim,
            src_pixdim,
            mode: Some(InterpMode::Linear),
            padding_mode: Some(PaddingMode::Border),
            dtype: Some(Dtype::F32),
            lazy: true,
        }
    }

    /// Queue the spacing change with call-time overrides.
    pub fn call(&self, img: NdImage, overrides: &SpacingOverrides) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let dims = shape.len() - 1;
        let broadcast = |v: &[f64]| {
            if v.len() == 1 && dims > 1 {
                vec![v[0]; dims]
            } else {
                v.to_vec()
            }
        };
        let (matrix, meta) = functional::spacing(
            &shape,
            &broadcast(&self.pixdim),
            &broadcast(&self.src_pixdim),
            overrides.mode.or(self.mode),
            overrides.padding_mode.or(self.padding_mode),
            self.dtype,
        )?;
        push_entry(img, "spacing", matrix, meta, self.lazy)
    }
}

impl Transform for Spacing {
    fn name(&self) -> &'static str {
        "spacing"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &SpacingOverrides::default())
    }
}

/// Exact rotation by quarter turns in one spatial plane.
#[derive(Debug, Clone)]
pub struct Rotate90 {
    /// Number of quarter turns.
    pub k: usize,
    /// The spatial plane to rotate in.
    pub plane: (usize, usize),
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
}

/// Call-time overrides for [`Rotate90`].
#[derive(Debug, Clone, Default)]
pub struct Rotate90Overrides {
    /// Replace the configured turn count.
    pub k: Option<usize>,
    /// Replace the configured plane.
    pub plane: Option<(usize, usize)>,
    /// Shape to build against instead of the image or queue hint.
    pub shape_override: Option<Vec<usize>>,
}

impl Rotate90 {
    /// Create a quarter-turn rotation in the first spatial plane.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            plane: (0, 1),
            lazy: true,
        }
    }

    /// Queue the rotation with call-time overrides.
    pub fn call(
        &self,
        img: NdImage,
        overrides: &Rotate90Overrides,
    ) -> Result<NdImage, TransformError> {
        let shape = effective_shape(&img, &overrides.shape_override);
        let k = overrides.k.unwrap_or(self.k);
        let plane = overrides.plane.unwrap_or(self.plane);
        let (matrix, meta) = functional::rotate90(&shape, k, plane)?;
        push_entry(img, "rotate90", matrix, meta, self.lazy)
    }
}

impl Transform for Rotate90 {
    fn name(&self) -> &'static str {
        "rotate90"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        self.call(img, &Rotate90Overrides::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{Flip, Resize, Rotate, Rotate90, Rotate90Overrides, RotateOverrides, Zoom};
    use crate::apply::apply_pending;
    use crate::error::TransformError;
    use crate::resample::AffineResampler;
    use crate::transforms::Transform;
    use latewarp_image::NdImage;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn deferred_rotate_only_queues() -> Result<(), TransformError> {
        let img = NdImage::from_shape_val(&[1, 16, 16], 1.0)?;
        let mut rotate = Rotate::new(vec![FRAC_PI_4]);

        let out = rotate.apply(img)?;

        assert_eq!(out.pending().len(), 1);
        assert_eq!(out.shape(), &[1, 16, 16]);
        assert!(out.as_slice().iter().all(|&v| v == 1.0));
        Ok(())
    }

    #[test]
    fn eager_matches_deferred_plus_flush() -> Result<(), TransformError> {
        let data: Vec<f32> = (0..64).map(|x| x as f32).collect();

        let mut eager = Rotate::new(vec![FRAC_PI_4]);
        eager.lazy = false;
        let eager_out = eager.apply(NdImage::new(&[1, 8, 8], data.clone())?)?;

        let mut deferred = Rotate::new(vec![FRAC_PI_4]);
        let queued = deferred.apply(NdImage::new(&[1, 8, 8], data)?)?;
        let deferred_out = apply_pending(queued, &AffineResampler)?;

        assert_eq!(eager_out.shape(), deferred_out.shape());
        assert_eq!(eager_out.as_slice(), deferred_out.as_slice());
        Ok(())
    }

    #[test]
    fn call_time_angles_beat_defaults() -> Result<(), TransformError> {
        let img = NdImage::from_shape_val(&[1, 8, 8], 0.0)?;
        let rotate = Rotate::new(vec![FRAC_PI_4]);

        let out = rotate.call(
            img,
            &RotateOverrides {
                angles: Some(vec![0.0]),
                ..Default::default()
            },
        )?;

        let entry = out.peek_pending().expect("entry was queued");
        assert_eq!(entry.matrix.at(0, 0), 1.0);
        assert_eq!(entry.matrix.at(0, 1), 0.0);
        Ok(())
    }

    #[test]
    fn zoom_broadcasts_a_single_factor() -> Result<(), TransformError> {
        let img = NdImage::from_shape_val(&[1, 8, 8], 0.0)?;
        let mut zoom = Zoom::new(vec![2.0]);

        let out = zoom.apply(img)?;

        let entry = out.peek_pending().expect("entry was queued");
        assert_eq!(entry.matrix.at(0, 0), 2.0);
        assert_eq!(entry.matrix.at(1, 1), 2.0);
        Ok(())
    }

    #[test]
    fn rotate90_reads_the_queued_shape_hint() -> Result<(), TransformError> {
        let img = NdImage::from_shape_val(&[1, 16, 16], 0.0)?;

        // resize changes the effective shape before rotate90 sees it
        let mut resize = Resize::new(vec![4, 8]);
        let img = resize.apply(img)?;
        let mut rot = Rotate90::new(1);
        let img = rot.call(img, &Rotate90Overrides::default())?;

        let entry = img.peek_pending().expect("entry was queued");
        assert_eq!(entry.meta.shape_override, Some(vec![1, 8, 4]));
        Ok(())
    }

    #[test]
    fn flip_twice_restores_samples() -> Result<(), TransformError> {
        let data: Vec<f32> = (0..12).map(|x| x as f32).collect();
        let img = NdImage::new(&[1, 3, 4], data.clone())?;

        let mut flip = Flip::new(vec![1]);
        let img = flip.apply(img)?;
        let img = flip.apply(img)?;
        let out = apply_pending(img, &AffineResampler)?;

        assert_eq!(out.as_slice(), data.as_slice());
        Ok(())
    }

    #[test]
    fn inverse_is_an_explicit_unsupported_condition() -> Result<(), TransformError> {
        let img = NdImage::from_shape_val(&[1, 8, 8], 0.0)?;
        let mut rotate = Rotate::new(vec![FRAC_PI_4]);

        let result = rotate.inverse(img);
        assert_eq!(
            result.unwrap_err(),
            TransformError::InverseNotSupported("rotate")
        );
        Ok(())
    }
}
