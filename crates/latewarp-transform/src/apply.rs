use latewarp_geometry::{
    extents_from_shape, shape_from_extents, transform_extents, AffineMatrix, Extent, MatrixFactory,
};
use latewarp_image::{NdImage, ResampleMeta};

use crate::error::TransformError;
use crate::resample::{Resample, ResampleParams};

/// Materialize all deferred operations queued on an image.
///
/// Walks the pending queue oldest first, composing each operation's
/// matrix increment onto a cumulative matrix and merging its resample
/// parameters, so that a run of operations with compatible parameters
/// costs exactly one resample pass. When an entry's parameters conflict
/// with the accumulated ones, the run so far is materialized with the
/// matrix and parameters accumulated strictly before that entry, the
/// cumulative state is re-seeded from the intermediate image, and the
/// entry starts the next run. A queue with `k` incompatibility
/// boundaries therefore costs `k + 1` resample calls.
///
/// The cumulative matrix is seeded with a translation moving the origin
/// to the image's spatial centroid, so rotation and scale increments
/// pivot about the center rather than a corner. Bounding extents are
/// recomputed from the original corners with the freshly composed
/// matrix after every step and determine the output shape whenever no
/// operation pinned one.
///
/// An image with an empty queue is returned untouched, with no
/// resampler invocation. Resampler failures propagate unmodified.
///
/// # Example
///
/// ```
/// use latewarp_image::NdImage;
/// use latewarp_transform::{apply_pending, AffineResampler};
///
/// let img = NdImage::from_shape_val(&[1, 8, 8], 1.0).unwrap();
/// let out = apply_pending(img, &AffineResampler).unwrap();
///
/// assert_eq!(out.shape(), &[1, 8, 8]);
/// ```
pub fn apply_pending<R: Resample>(
    mut img: NdImage,
    resampler: &R,
) -> Result<NdImage, TransformError> {
    if !img.has_pending() {
        return Ok(img);
    }
    let entries = img.take_pending().into_entries();
    let mut current = img;

    let (mut cumulative, mut corners) = centroid_seed(&current)?;
    let mut extents = transform_extents(&cumulative, &corners)?;
    let mut acc_meta = ResampleMeta::default();
    let mut merged = 0usize;

    for entry in &entries {
        if !acc_meta.is_compatible_with(&entry.meta) {
            log::debug!(
                "resample parameters incompatible after {merged} merged ops, materializing intermediate image"
            );
            current = materialize(&current, &cumulative, &extents, &acc_meta, resampler)?;
            let seeded = centroid_seed(&current)?;
            cumulative = seeded.0;
            corners = seeded.1;
            extents = transform_extents(&cumulative, &corners)?;
            acc_meta = ResampleMeta::default();
            merged = 0;
        }
        cumulative = cumulative.then(&entry.matrix)?;
        extents = transform_extents(&cumulative, &corners)?;
        acc_meta.absorb(&entry.meta);
        merged += 1;
    }

    log::debug!("materializing {merged} deferred ops in one resample");
    let mut result = materialize(&current, &cumulative, &extents, &acc_meta, resampler)?;
    result.clear_pending();
    Ok(result)
}

/// The starting matrix and corner set for one compatible run: identity
/// pre-composed with the translation to the spatial centroid, and the
/// untransformed corners of the image bounding box.
fn centroid_seed(img: &NdImage) -> Result<(AffineMatrix, Vec<Extent>), TransformError> {
    let fac = MatrixFactory::new(img.spatial_dims());
    let center: Vec<f64> = img
        .spatial_shape()
        .iter()
        .map(|&s| -(s as f64) / 2.0)
        .collect();
    let matrix = fac.identity().then(&fac.translate(&center)?)?;
    let corners = extents_from_shape(img.shape())?;
    Ok((matrix, corners))
}

/// One resample pass over the accumulated run. The output shape is the
/// accumulated shape hint when an operation pinned one, otherwise the
/// span of the transformed extents; the cumulative matrix is shifted
/// from centered output space into output index space before the call.
fn materialize<R: Resample>(
    img: &NdImage,
    cumulative: &AffineMatrix,
    extents: &[Extent],
    meta: &ResampleMeta,
    resampler: &R,
) -> Result<NdImage, TransformError> {
    let target_shape = match &meta.shape_override {
        Some(shape) => shape.clone(),
        None => shape_from_extents(img.shape(), extents)?,
    };

    let fac = MatrixFactory::new(img.spatial_dims());
    let out_center: Vec<f64> = target_shape[1..].iter().map(|&s| s as f64 / 2.0).collect();
    let full = cumulative.then(&fac.translate(&out_center)?)?;

    let params = ResampleParams {
        mode: meta.mode,
        padding_mode: meta.padding_mode,
        device: meta.device,
        dtype: meta.dtype,
        target_shape: Some(target_shape),
    };
    Ok(resampler.resample(img, &full, &params)?)
}
