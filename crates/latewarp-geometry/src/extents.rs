use crate::error::GeometryError;
use crate::matrix::AffineMatrix;

/// A homogeneous bounding-box corner coordinate with trailing `1`.
pub type Extent = Vec<f64>;

/// Enumerate the 2^d homogeneous corners of an image's bounding box.
///
/// The leading axis of `shape` is the channel axis and is skipped; each
/// remaining axis contributes its `0` and `size` bound. Corners are
/// ordered with the first spatial axis varying slowest.
///
/// # Arguments
///
/// * `shape` - The image shape as `[channels, spatial...]`.
///
/// # Errors
///
/// Returns an error if `shape` has no spatial axes.
///
/// # Example
///
/// ```
/// use latewarp_geometry::extents_from_shape;
///
/// let corners = extents_from_shape(&[1, 24, 32]).unwrap();
///
/// assert_eq!(corners, vec![
///     vec![0.0, 0.0, 1.0],
///     vec![0.0, 32.0, 1.0],
///     vec![24.0, 0.0, 1.0],
///     vec![24.0, 32.0, 1.0],
/// ]);
/// ```
pub fn extents_from_shape(shape: &[usize]) -> Result<Vec<Extent>, GeometryError> {
    if shape.len() < 2 {
        return Err(GeometryError::InvalidShape(shape.len()));
    }
    let dims = shape.len() - 1;
    let count = 1usize << dims;

    let mut corners = Vec::with_capacity(count);
    for mask in 0..count {
        let mut corner = Vec::with_capacity(dims + 1);
        for (axis, size) in shape[1..].iter().enumerate() {
            let hi = (mask >> (dims - 1 - axis)) & 1 == 1;
            corner.push(if hi { *size as f64 } else { 0.0 });
        }
        corner.push(1.0);
        corners.push(corner);
    }
    Ok(corners)
}

/// Transform every corner of an extent set by one matrix.
///
/// # Errors
///
/// Returns an error if a corner length does not match the matrix rank.
pub fn transform_extents(
    matrix: &AffineMatrix,
    extents: &[Extent],
) -> Result<Vec<Extent>, GeometryError> {
    extents
        .iter()
        .map(|e| matrix.transform_point(e))
        .collect()
}

/// Derive the minimal output shape covering a transformed extent set.
///
/// Each spatial axis spans `ceil(max - min)` over the corners; the
/// leading channel axis is copied from `src_shape` untouched.
///
/// # Arguments
///
/// * `src_shape` - The source shape supplying the channel axis.
/// * `extents` - The 2^d transformed corners.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidCornerCount`] if the corner count is
/// not 2^d for the spatial rank of `src_shape`.
pub fn shape_from_extents(
    src_shape: &[usize],
    extents: &[Extent],
) -> Result<Vec<usize>, GeometryError> {
    if src_shape.len() < 2 {
        return Err(GeometryError::InvalidShape(src_shape.len()));
    }
    let dims = src_shape.len() - 1;
    let expected = 1usize << dims;
    if extents.len() != expected {
        return Err(GeometryError::InvalidCornerCount {
            dim: dims,
            expected,
            actual: extents.len(),
        });
    }
    for e in extents {
        if e.len() != dims + 1 {
            return Err(GeometryError::LengthMismatch {
                dim: dims,
                expected: dims + 1,
                actual: e.len(),
            });
        }
    }

    let mut shape = Vec::with_capacity(dims + 1);
    shape.push(src_shape[0]);
    for axis in 0..dims {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for e in extents {
            min = min.min(e[axis]);
            max = max.max(e[axis]);
        }
        shape.push((max - min).ceil() as usize);
    }
    Ok(shape)
}
