use latewarp_geometry::{extents_from_shape, shape_from_extents, transform_extents, AffineMatrix};
use latewarp_image::{Device, Dtype, InterpMode, NdImage, PaddingMode};
use num_traits::Float;
use rayon::{iter::IndexedParallelIterator, iter::ParallelIterator, slice::ParallelSliceMut};

use super::{Resample, ResampleError, ResampleParams};

/// CPU reference resampler for 2-D and 3-D images.
///
/// Inverts the affine matrix to find the source position of every
/// output element, then interpolates with the requested mode and
/// padding. The matrix maps source index coordinates to output index
/// coordinates; both ends are sampled at voxel centers, so exact
/// integer mappings (flips, 90-degree rotations, whole translations)
/// reproduce samples bit for bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AffineResampler;

impl Resample for AffineResampler {
    fn resample(
        &self,
        img: &NdImage,
        matrix: &AffineMatrix,
        params: &ResampleParams,
    ) -> Result<NdImage, ResampleError> {
        let device = params.device.unwrap_or(Device::Cpu);
        if !device.is_cpu() {
            return Err(ResampleError::UnsupportedDevice(device));
        }
        if !img.device().is_cpu() {
            return Err(ResampleError::UnsupportedDevice(img.device()));
        }

        let dims = img.spatial_dims();
        if dims != 2 && dims != 3 {
            return Err(ResampleError::UnsupportedDimension(dims));
        }
        if matrix.spatial_dims() != dims {
            return Err(latewarp_geometry::GeometryError::DimensionMismatch(
                matrix.spatial_dims(),
                dims,
            )
            .into());
        }

        let out_shape = match &params.target_shape {
            Some(shape) => {
                if shape.len() != img.shape().len() {
                    return Err(ResampleError::TargetShapeMismatch {
                        expected: img.shape().len(),
                        actual: shape.len(),
                    });
                }
                if shape[0] != img.num_channels() {
                    return Err(ResampleError::ChannelMismatch {
                        expected: img.num_channels(),
                        actual: shape[0],
                    });
                }
                shape.clone()
            }
            None => {
                let corners = extents_from_shape(img.shape())?;
                let transformed = transform_extents(matrix, &corners)?;
                shape_from_extents(img.shape(), &transformed)?
            }
        };

        let mode = params.mode.unwrap_or(InterpMode::Linear);
        let padding = params.padding_mode.unwrap_or(PaddingMode::Border);
        let dtype = params.dtype.unwrap_or(Dtype::F32);
        let inv = matrix.inverse()?;

        let data = match dims {
            2 => warp_2d(img, &inv, &out_shape, mode, padding, dtype),
            _ => warp_3d(img, &inv, &out_shape, mode, padding, dtype),
        };

        Ok(NdImage::new(&out_shape, data)?)
    }
}

fn warp_2d(
    src: &NdImage,
    inv: &AffineMatrix,
    out_shape: &[usize],
    mode: InterpMode,
    padding: PaddingMode,
    dtype: Dtype,
) -> Vec<f32> {
    let (out_h, out_w) = (out_shape[1], out_shape[2]);
    let m = [
        inv.at(0, 0),
        inv.at(0, 1),
        inv.at(0, 2),
        inv.at(1, 0),
        inv.at(1, 1),
        inv.at(1, 2),
    ];

    let mut data = vec![0.0f32; out_shape[0] * out_h * out_w];
    if out_w == 0 {
        return data;
    }

    data.par_chunks_exact_mut(out_w)
        .enumerate()
        .for_each(|(i, row)| {
            let c = i / out_h;
            let y = i % out_h;
            let qy = y as f64 + 0.5;
            for (x, dst) in row.iter_mut().enumerate() {
                let qx = x as f64 + 0.5;
                let p0 = m[0] * qy + m[1] * qx + m[2] - 0.5;
                let p1 = m[3] * qy + m[4] * qx + m[5] - 0.5;
                *dst = match dtype {
                    Dtype::F32 => sample_2d::<f32>(src, c, p0, p1, mode, padding),
                    Dtype::F64 => sample_2d::<f64>(src, c, p0, p1, mode, padding),
                };
            }
        });

    data
}

fn warp_3d(
    src: &NdImage,
    inv: &AffineMatrix,
    out_shape: &[usize],
    mode: InterpMode,
    padding: PaddingMode,
    dtype: Dtype,
) -> Vec<f32> {
    let (out_0, out_1, out_2) = (out_shape[1], out_shape[2], out_shape[3]);
    let mut m = [0.0f64; 12];
    for r in 0..3 {
        for k in 0..4 {
            m[r * 4 + k] = inv.at(r, k);
        }
    }

    let mut data = vec![0.0f32; out_shape[0] * out_0 * out_1 * out_2];
    if out_2 == 0 {
        return data;
    }

    data.par_chunks_exact_mut(out_2)
        .enumerate()
        .for_each(|(i, row)| {
            let c = i / (out_0 * out_1);
            let rem = i % (out_0 * out_1);
            let q0 = (rem / out_1) as f64 + 0.5;
            let q1 = (rem % out_1) as f64 + 0.5;
            for (x, dst) in row.iter_mut().enumerate() {
                let q2 = x as f64 + 0.5;
                let p0 = m[0] * q0 + m[1] * q1 + m[2] * q2 + m[3] - 0.5;
                let p1 = m[4] * q0 + m[5] * q1 + m[6] * q2 + m[7] - 0.5;
                let p2 = m[8] * q0 + m[9] * q1 + m[10] * q2 + m[11] - 0.5;
                *dst = match dtype {
                    Dtype::F32 => sample_3d::<f32>(src, c, p0, p1, p2, mode, padding),
                    Dtype::F64 => sample_3d::<f64>(src, c, p0, p1, p2, mode, padding),
                };
            }
        });

    data
}

/// Map a possibly out-of-bounds index into the valid range, or `None`
/// when the padding mode contributes zero instead.
fn resolve_index(i: isize, len: usize, padding: PaddingMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }
    match padding {
        PaddingMode::Zeros => None,
        PaddingMode::Border => Some(i.clamp(0, len as isize - 1) as usize),
        PaddingMode::Reflection => {
            if len == 1 {
                return Some(0);
            }
            let len = len as isize;
            let mut i = i;
            while i < 0 || i >= len {
                if i < 0 {
                    i = -i - 1;
                } else {
                    i = 2 * len - i - 1;
                }
            }
            Some(i as usize)
        }
    }
}

fn sample_2d<T: Float>(
    src: &NdImage,
    c: usize,
    p0: f64,
    p1: f64,
    mode: InterpMode,
    padding: PaddingMode,
) -> f32 {
    let (h, w) = (src.shape()[1], src.shape()[2]);
    let plane = h * w;
    let data = src.as_slice();

    match mode {
        InterpMode::Nearest => {
            let i0 = resolve_index(p0.round() as isize, h, padding);
            let i1 = resolve_index(p1.round() as isize, w, padding);
            match (i0, i1) {
                (Some(a), Some(b)) => data[c * plane + a * w + b],
                _ => 0.0,
            }
        }
        InterpMode::Linear => {
            let f0 = p0.floor();
            let f1 = p1.floor();
            let t0 = T::from(p0 - f0).unwrap_or_else(T::zero);
            let t1 = T::from(p1 - f1).unwrap_or_else(T::zero);
            let one = T::one();

            let mut acc = T::zero();
            for (d0, w0) in [(0isize, one - t0), (1, t0)] {
                for (d1, w1) in [(0isize, one - t1), (1, t1)] {
                    let a = resolve_index(f0 as isize + d0, h, padding);
                    let b = resolve_index(f1 as isize + d1, w, padding);
                    if let (Some(a), Some(b)) = (a, b) {
                        let v = T::from(data[c * plane + a * w + b]).unwrap_or_else(T::zero);
                        acc = acc + w0 * w1 * v;
                    }
                }
            }
            acc.to_f32().unwrap_or(0.0)
        }
    }
}

fn sample_3d<T: Float>(
    src: &NdImage,
    c: usize,
    p0: f64,
    p1: f64,
    p2: f64,
    mode: InterpMode,
    padding: PaddingMode,
) -> f32 {
    let (s0, s1, s2) = (src.shape()[1], src.shape()[2], src.shape()[3]);
    let volume = s0 * s1 * s2;
    let data = src.as_slice();

    match mode {
        InterpMode::Nearest => {
            let i0 = resolve_index(p0.round() as isize, s0, padding);
            let i1 = resolve_index(p1.round() as isize, s1, padding);
            let i2 = resolve_index(p2.round() as isize, s2, padding);
            match (i0, i1, i2) {
                (Some(a), Some(b), Some(d)) => data[c * volume + (a * s1 + b) * s2 + d],
                _ => 0.0,
            }
        }
        InterpMode::Linear => {
            let f0 = p0.floor();
            let f1 = p1.floor();
            let f2 = p2.floor();
            let t0 = T::from(p0 - f0).unwrap_or_else(T::zero);
            let t1 = T::from(p1 - f1).unwrap_or_else(T::zero);
            let t2 = T::from(p2 - f2).unwrap_or_else(T::zero);
            let one = T::one();

            let mut acc = T::zero();
            for (d0, w0) in [(0isize, one - t0), (1, t0)] {
                for (d1, w1) in [(0isize, one - t1), (1, t1)] {
                    for (d2, w2) in [(0isize, one - t2), (1, t2)] {
                        let a = resolve_index(f0 as isize + d0, s0, padding);
                        let b = resolve_index(f1 as isize + d1, s1, padding);
                        let d = resolve_index(f2 as isize + d2, s2, padding);
                        if let (Some(a), Some(b), Some(d)) = (a, b, d) {
                            let v = T::from(data[c * volume + (a * s1 + b) * s2 + d])
                                .unwrap_or_else(T::zero);
                            acc = acc + w0 * w1 * w2 * v;
                        }
                    }
                }
            }
            acc.to_f32().unwrap_or(0.0)
        }
    }
}
