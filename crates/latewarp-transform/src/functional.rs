//! Pure per-operation builders.
//!
//! Each builder maps the current image shape and the operation's
//! parameters to an affine matrix increment plus the resample
//! parameters to queue alongside it. Builders never touch pixel data;
//! malformed parameters error here, before anything reaches the queue.
//!
//! All increments act on coordinates centered on the image, the frame
//! the apply engine seeds with its centroid translation, so rotation
//! and scale pivot about the image center.

use latewarp_geometry::{
    extents_from_shape, shape_from_extents, transform_extents, AffineMatrix, MatrixFactory,
};
use latewarp_image::{Dtype, InterpMode, PaddingMode, ResampleMeta};

use crate::error::TransformError;

/// How a resize target is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    /// One target size per spatial axis.
    All,
    /// A single target for the longest axis; the rest scale uniformly.
    Longest,
}

/// The spatial rank of a shape with a leading channel axis.
fn spatial_dims(shape: &[usize]) -> Result<usize, TransformError> {
    if shape.len() < 2 {
        return Err(latewarp_geometry::GeometryError::InvalidShape(shape.len()).into());
    }
    Ok(shape.len() - 1)
}

/// The bounding shape an increment produces when applied about the
/// image center.
fn spanned_shape(shape: &[usize], increment: &AffineMatrix) -> Result<Vec<usize>, TransformError> {
    let fac = MatrixFactory::new(shape.len() - 1);
    let center: Vec<f64> = shape[1..].iter().map(|&s| -(s as f64) / 2.0).collect();
    let m = fac.translate(&center)?.then(increment)?;
    let corners = extents_from_shape(shape)?;
    let extents = transform_extents(&m, &corners)?;
    Ok(shape_from_extents(shape, &extents)?)
}

/// Rotation by Euler angles about the image center.
///
/// With `keep_size` the output shape is pinned to the input shape;
/// otherwise it grows to the rotated bounding box.
pub fn rotate(
    shape: &[usize],
    angles: &[f64],
    keep_size: bool,
    mode: Option<InterpMode>,
    padding_mode: Option<PaddingMode>,
    dtype: Option<Dtype>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let fac = MatrixFactory::new(spatial_dims(shape)?);
    let matrix = fac.rotate_euler(angles)?;
    let shape_override = if keep_size {
        shape.to_vec()
    } else {
        spanned_shape(shape, &matrix)?
    };
    let meta = ResampleMeta {
        mode,
        padding_mode,
        dtype,
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Anisotropic zoom about the image center.
pub fn zoom(
    shape: &[usize],
    factors: &[f64],
    keep_size: bool,
    mode: Option<InterpMode>,
    padding_mode: Option<PaddingMode>,
    dtype: Option<Dtype>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    if factors.iter().any(|&f| f <= 0.0 || !f.is_finite()) {
        return Err(TransformError::InvalidConfig {
            op: "zoom",
            reason: format!("zoom factors must be positive and finite, got {factors:?}"),
        });
    }
    let fac = MatrixFactory::new(spatial_dims(shape)?);
    let matrix = fac.scale(factors)?;
    let shape_override = if keep_size {
        shape.to_vec()
    } else {
        spanned_shape(shape, &matrix)?
    };
    let meta = ResampleMeta {
        mode,
        padding_mode,
        dtype,
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Mirror the image along the given spatial axes.
pub fn flip(shape: &[usize], axes: &[usize]) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let dims = spatial_dims(shape)?;
    let mut factors = vec![1.0; dims];
    for &axis in axes {
        if axis >= dims {
            return Err(TransformError::InvalidConfig {
                op: "flip",
                reason: format!("spatial axis {axis} out of range for rank {dims}"),
            });
        }
        if factors[axis] < 0.0 {
            return Err(TransformError::InvalidConfig {
                op: "flip",
                reason: format!("spatial axis {axis} listed twice"),
            });
        }
        factors[axis] = -1.0;
    }
    let matrix = MatrixFactory::new(dims).scale(&factors)?;
    Ok((matrix, ResampleMeta::default()))
}

/// Scale the image to an explicit spatial size.
pub fn resize(
    shape: &[usize],
    target: &[usize],
    size_mode: SizeMode,
    mode: Option<InterpMode>,
    dtype: Option<Dtype>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let dims = spatial_dims(shape)?;
    if target.iter().any(|&t| t == 0) || shape[1..].iter().any(|&s| s == 0) {
        return Err(TransformError::InvalidConfig {
            op: "resize",
            reason: "target and source sizes must be positive".to_string(),
        });
    }

    let (factors, resolved): (Vec<f64>, Vec<usize>) = match size_mode {
        SizeMode::All => {
            if target.len() != dims {
                return Err(TransformError::InvalidConfig {
                    op: "resize",
                    reason: format!("expected {dims} target sizes, got {}", target.len()),
                });
            }
            let factors = target
                .iter()
                .zip(shape[1..].iter())
                .map(|(&t, &s)| t as f64 / s as f64)
                .collect();
            (factors, target.to_vec())
        }
        SizeMode::Longest => {
            if target.len() != 1 {
                return Err(TransformError::InvalidConfig {
                    op: "resize",
                    reason: format!("longest mode takes one target size, got {}", target.len()),
                });
            }
            // longest spatial axis; shape has at least one by construction
            let longest = shape[1..].iter().copied().max().unwrap_or(1);
            let f = target[0] as f64 / longest as f64;
            let resolved = shape[1..]
                .iter()
                .map(|&s| (s as f64 * f).ceil() as usize)
                .collect();
            (vec![f; dims], resolved)
        }
    };

    let matrix = MatrixFactory::new(dims).scale(&factors)?;
    let mut shape_override = Vec::with_capacity(shape.len());
    shape_override.push(shape[0]);
    shape_override.extend(resolved);
    let meta = ResampleMeta {
        mode,
        dtype,
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Shift the image contents by per-axis offsets on a fixed canvas.
pub fn translate(
    shape: &[usize],
    offsets: &[f64],
    mode: Option<InterpMode>,
    padding_mode: Option<PaddingMode>,
    dtype: Option<Dtype>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let matrix = MatrixFactory::new(spatial_dims(shape)?).translate(offsets)?;
    let meta = ResampleMeta {
        mode,
        padding_mode,
        dtype,
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Resample to a new voxel spacing.
///
/// Each axis scales by `src_pixdim / pixdim`; the output shape grows or
/// shrinks accordingly.
pub fn spacing(
    shape: &[usize],
    pixdim: &[f64],
    src_pixdim: &[f64],
    mode: Option<InterpMode>,
    padding_mode: Option<PaddingMode>,
    dtype: Option<Dtype>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let dims = spatial_dims(shape)?;
    if pixdim.len() != dims || src_pixdim.len() != dims {
        return Err(TransformError::InvalidConfig {
            op: "spacing",
            reason: format!(
                "expected {dims} spacings, got {} target and {} source",
                pixdim.len(),
                src_pixdim.len()
            ),
        });
    }
    if pixdim
        .iter()
        .chain(src_pixdim.iter())
        .any(|&p| p <= 0.0 || !p.is_finite())
    {
        return Err(TransformError::InvalidConfig {
            op: "spacing",
            reason: "spacings must be positive and finite".to_string(),
        });
    }

    let factors: Vec<f64> = src_pixdim
        .iter()
        .zip(pixdim.iter())
        .map(|(&src, &dst)| src / dst)
        .collect();
    let matrix = MatrixFactory::new(dims).scale(&factors)?;

    let mut shape_override = Vec::with_capacity(shape.len());
    shape_override.push(shape[0]);
    for (&s, &f) in shape[1..].iter().zip(factors.iter()) {
        shape_override.push((s as f64 * f).ceil() as usize);
    }
    let meta = ResampleMeta {
        mode,
        padding_mode,
        dtype,
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Crop and/or pad with signed per-axis index ranges.
///
/// A range `(start, end)` selects `[start, end)` along its axis;
/// negative starts and ends past the bound pad with the queued padding
/// mode. The increment is the translation re-centering the selected
/// window.
pub fn croppad(
    shape: &[usize],
    ranges: &[(i64, i64)],
    padding_mode: Option<PaddingMode>,
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let dims = spatial_dims(shape)?;
    if ranges.len() != dims {
        return Err(TransformError::InvalidConfig {
            op: "croppad",
            reason: format!("expected {dims} ranges, got {}", ranges.len()),
        });
    }
    if ranges.iter().any(|&(start, end)| end <= start) {
        return Err(TransformError::InvalidConfig {
            op: "croppad",
            reason: format!("ranges must be non-empty, got {ranges:?}"),
        });
    }

    let mut offsets = Vec::with_capacity(dims);
    let mut shape_override = Vec::with_capacity(shape.len());
    shape_override.push(shape[0]);
    for (&(start, end), &s) in ranges.iter().zip(shape[1..].iter()) {
        let window_center = (start + end) as f64 / 2.0;
        offsets.push(s as f64 / 2.0 - window_center);
        shape_override.push((end - start) as usize);
    }

    let matrix = MatrixFactory::new(dims).translate(&offsets)?;
    let meta = ResampleMeta {
        padding_mode,
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

/// Exact rotation by `k` quarter turns in one spatial plane.
pub fn rotate90(
    shape: &[usize],
    k: usize,
    plane: (usize, usize),
) -> Result<(AffineMatrix, ResampleMeta), TransformError> {
    let dims = spatial_dims(shape)?;
    let (a, b) = plane;
    if a == b || a >= dims || b >= dims {
        return Err(TransformError::InvalidConfig {
            op: "rotate90",
            reason: format!("plane axes ({a}, {b}) must be distinct spatial axes of rank {dims}"),
        });
    }

    // exact integer entries, no trigonometry
    let (cos, sin) = match k % 4 {
        0 => (1.0, 0.0),
        1 => (0.0, 1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    };

    let fac = MatrixFactory::new(dims);
    let n = dims + 1;
    let mut data = fac.identity().as_slice().to_vec();
    data[a * n + a] = cos;
    data[a * n + b] = -sin;
    data[b * n + a] = sin;
    data[b * n + b] = cos;
    let matrix = AffineMatrix::from_rows(dims, data)?;

    let mut shape_override = shape.to_vec();
    if k % 2 == 1 {
        shape_override.swap(a + 1, b + 1);
    }
    let meta = ResampleMeta {
        shape_override: Some(shape_override),
        ..Default::default()
    };
    Ok((matrix, meta))
}

#[cfg(test)]
mod tests {
    use super::{croppad, flip, resize, rotate, rotate90, spacing, zoom, SizeMode};
    use crate::error::TransformError;
    use approx::assert_relative_eq;
    use latewarp_image::{InterpMode, PaddingMode};
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn rotate_keep_size_pins_shape() -> Result<(), TransformError> {
        let (_, meta) = rotate(
            &[1, 64, 64],
            &[FRAC_PI_4],
            true,
            Some(InterpMode::Linear),
            Some(PaddingMode::Border),
            None,
        )?;
        assert_eq!(meta.shape_override, Some(vec![1, 64, 64]));
        Ok(())
    }

    #[test]
    fn rotate_grows_to_the_rotated_bounds() -> Result<(), TransformError> {
        let (_, meta) = rotate(&[1, 64, 64], &[FRAC_PI_4], false, None, None, None)?;
        // a 45 degree rotation of a 64 square spans 64 * sqrt(2)
        assert_eq!(meta.shape_override, Some(vec![1, 91, 91]));
        Ok(())
    }

    #[test]
    fn zoom_rejects_non_positive_factors() {
        let result = zoom(&[1, 8, 8], &[0.0, 1.0], true, None, None, None);
        assert!(matches!(
            result,
            Err(TransformError::InvalidConfig { op: "zoom", .. })
        ));
    }

    #[test]
    fn zoom_scales_the_output_shape() -> Result<(), TransformError> {
        let (_, meta) = zoom(&[1, 10, 20], &[2.0, 0.5], false, None, None, None)?;
        assert_eq!(meta.shape_override, Some(vec![1, 20, 10]));
        Ok(())
    }

    #[test]
    fn flip_negates_the_chosen_axis() -> Result<(), TransformError> {
        let (matrix, meta) = flip(&[1, 8, 8], &[1])?;
        assert_eq!(matrix.at(0, 0), 1.0);
        assert_eq!(matrix.at(1, 1), -1.0);
        assert_eq!(meta.shape_override, None);
        Ok(())
    }

    #[test]
    fn flip_rejects_out_of_range_axis() {
        assert!(matches!(
            flip(&[1, 8, 8], &[2]),
            Err(TransformError::InvalidConfig { op: "flip", .. })
        ));
    }

    #[test]
    fn resize_all_takes_explicit_targets() -> Result<(), TransformError> {
        let (matrix, meta) = resize(&[1, 24, 32], &[40, 40], SizeMode::All, None, None)?;
        assert_eq!(meta.shape_override, Some(vec![1, 40, 40]));
        assert_relative_eq!(matrix.at(0, 0), 40.0 / 24.0, epsilon = 1e-12);
        assert_relative_eq!(matrix.at(1, 1), 40.0 / 32.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn resize_longest_scales_uniformly() -> Result<(), TransformError> {
        let (_, meta) = resize(&[1, 24, 32], &[64], SizeMode::Longest, None, None)?;
        assert_eq!(meta.shape_override, Some(vec![1, 48, 64]));
        Ok(())
    }

    #[test]
    fn spacing_rescales_shape_per_axis() -> Result<(), TransformError> {
        let (_, meta) = spacing(
            &[1, 24, 32],
            &[0.5, 0.6],
            &[1.0, 1.0],
            Some(InterpMode::Linear),
            Some(PaddingMode::Border),
            None,
        )?;
        // factors 2.0 and 1.667: 48 and ceil(53.3)
        assert_eq!(meta.shape_override, Some(vec![1, 48, 54]));
        Ok(())
    }

    #[test]
    fn croppad_selects_a_window() -> Result<(), TransformError> {
        let (matrix, meta) = croppad(&[1, 16, 16], &[(4, 12), (-2, 10)], None)?;
        assert_eq!(meta.shape_override, Some(vec![1, 8, 12]));
        // window centers are 8 and 4; image center is 8
        assert_eq!(matrix.at(0, 2), 0.0);
        assert_eq!(matrix.at(1, 2), 4.0);
        Ok(())
    }

    #[test]
    fn croppad_rejects_empty_ranges() {
        assert!(matches!(
            croppad(&[1, 16, 16], &[(4, 4), (0, 8)], None),
            Err(TransformError::InvalidConfig { op: "croppad", .. })
        ));
    }

    #[test]
    fn rotate90_is_exact_and_swaps_extents() -> Result<(), TransformError> {
        let (matrix, meta) = rotate90(&[1, 2, 4], 1, (0, 1))?;
        assert_eq!(matrix.at(0, 0), 0.0);
        assert_eq!(matrix.at(0, 1), -1.0);
        assert_eq!(matrix.at(1, 0), 1.0);
        assert_eq!(matrix.at(1, 1), 0.0);
        assert_eq!(meta.shape_override, Some(vec![1, 4, 2]));
        Ok(())
    }

    #[test]
    fn rotate90_full_turn_keeps_shape() -> Result<(), TransformError> {
        let (matrix, meta) = rotate90(&[1, 2, 4], 4, (0, 1))?;
        assert_eq!(matrix.at(0, 0), 1.0);
        assert_eq!(meta.shape_override, Some(vec![1, 2, 4]));
        Ok(())
    }
}
