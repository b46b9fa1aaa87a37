use crate::error::GeometryError;
use crate::matrix::AffineMatrix;

/// Builds homogeneous affine matrices for a fixed spatial rank.
///
/// All matrices produced by one factory share the same `(d + 1) x (d + 1)`
/// layout, so they compose with [`AffineMatrix::then`] without further
/// checks.
///
/// # Examples
///
/// ```
/// use latewarp_geometry::MatrixFactory;
///
/// let fac = MatrixFactory::new(2);
/// let m = fac.scale(&[2.0, 0.5]).unwrap();
///
/// assert_eq!(m.at(0, 0), 2.0);
/// assert_eq!(m.at(1, 1), 0.5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MatrixFactory {
    dims: usize,
}

impl MatrixFactory {
    /// Create a factory for the given spatial rank.
    pub fn new(spatial_dims: usize) -> Self {
        Self { dims: spatial_dims }
    }

    /// The spatial rank the factory builds for.
    pub fn spatial_dims(&self) -> usize {
        self.dims
    }

    /// The identity transform.
    pub fn identity(&self) -> AffineMatrix {
        let n = self.dims + 1;
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        AffineMatrix::from_rows(self.dims, data)
            .expect("identity data length is always n * n")
    }

    /// A translation by the given per-axis offsets.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset count does not match the rank.
    pub fn translate(&self, offsets: &[f64]) -> Result<AffineMatrix, GeometryError> {
        self.check_len(offsets.len())?;
        let n = self.dims + 1;
        let mut data = self.identity().as_slice().to_vec();
        for (i, t) in offsets.iter().enumerate() {
            data[i * n + (n - 1)] = *t;
        }
        AffineMatrix::from_rows(self.dims, data)
    }

    /// An anisotropic scale by the given per-axis factors.
    ///
    /// # Errors
    ///
    /// Returns an error if the factor count does not match the rank.
    pub fn scale(&self, factors: &[f64]) -> Result<AffineMatrix, GeometryError> {
        self.check_len(factors.len())?;
        let n = self.dims + 1;
        let mut data = vec![0.0; n * n];
        for (i, s) in factors.iter().enumerate() {
            data[i * n + i] = *s;
        }
        data[n * n - 1] = 1.0;
        AffineMatrix::from_rows(self.dims, data)
    }

    /// An Euler rotation.
    ///
    /// Rank 2 takes one angle and produces
    /// `[[cos, -sin, 0], [sin, cos, 0], [0, 0, 1]]`. Rank 3 takes three
    /// angles, one about each spatial axis, multiplied in x * y * z
    /// order. Angles are in radians.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedDimension`] for ranks other
    /// than 2 and 3, and a length error when the angle count is wrong.
    pub fn rotate_euler(&self, angles: &[f64]) -> Result<AffineMatrix, GeometryError> {
        match self.dims {
            2 => {
                if angles.len() != 1 {
                    return Err(GeometryError::LengthMismatch {
                        dim: 2,
                        expected: 1,
                        actual: angles.len(),
                    });
                }
                let (s, c) = angles[0].sin_cos();
                AffineMatrix::from_rows(
                    2,
                    vec![
                        c, -s, 0.0, //
                        s, c, 0.0, //
                        0.0, 0.0, 1.0,
                    ],
                )
            }
            3 => {
                if angles.len() != 3 {
                    return Err(GeometryError::LengthMismatch {
                        dim: 3,
                        expected: 3,
                        actual: angles.len(),
                    });
                }
                let (sx, cx) = angles[0].sin_cos();
                let (sy, cy) = angles[1].sin_cos();
                let (sz, cz) = angles[2].sin_cos();

                let rx = AffineMatrix::from_rows(
                    3,
                    vec![
                        1.0, 0.0, 0.0, 0.0, //
                        0.0, cx, -sx, 0.0, //
                        0.0, sx, cx, 0.0, //
                        0.0, 0.0, 0.0, 1.0,
                    ],
                )?;
                let ry = AffineMatrix::from_rows(
                    3,
                    vec![
                        cy, 0.0, sy, 0.0, //
                        0.0, 1.0, 0.0, 0.0, //
                        -sy, 0.0, cy, 0.0, //
                        0.0, 0.0, 0.0, 1.0,
                    ],
                )?;
                let rz = AffineMatrix::from_rows(
                    3,
                    vec![
                        cz, -sz, 0.0, 0.0, //
                        sz, cz, 0.0, 0.0, //
                        0.0, 0.0, 1.0, 0.0, //
                        0.0, 0.0, 0.0, 1.0,
                    ],
                )?;

                // product rx * ry * rz: the z rotation acts on points first
                rz.then(&ry)?.then(&rx)
            }
            d => Err(GeometryError::UnsupportedDimension(d)),
        }
    }

    fn check_len(&self, actual: usize) -> Result<(), GeometryError> {
        if actual != self.dims {
            return Err(GeometryError::LengthMismatch {
                dim: self.dims,
                expected: self.dims,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MatrixFactory;
    use crate::error::GeometryError;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8};

    fn assert_matrix_eq(actual: &crate::AffineMatrix, expected: &[f64]) {
        for (a, e) in actual.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-6);
        }
    }

    #[test]
    fn rotation_pi_by_2() -> Result<(), GeometryError> {
        let fac = MatrixFactory::new(2);
        let mat = fac.rotate_euler(&[FRAC_PI_2])?;
        #[rustfmt::skip]
        let expected = [
            0.0, -1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        assert_matrix_eq(&mat, &expected);
        Ok(())
    }

    #[test]
    fn rotation_pi_by_4() -> Result<(), GeometryError> {
        let fac = MatrixFactory::new(2);
        let mat = fac.rotate_euler(&[FRAC_PI_4])?;
        let c = FRAC_PI_4.cos();
        #[rustfmt::skip]
        let expected = [
            c, -c, 0.0,
            c, c, 0.0,
            0.0, 0.0, 1.0,
        ];
        assert_matrix_eq(&mat, &expected);
        Ok(())
    }

    #[test]
    fn rotation_pi_by_8() -> Result<(), GeometryError> {
        let fac = MatrixFactory::new(2);
        let mat = fac.rotate_euler(&[FRAC_PI_8])?;
        let c = FRAC_PI_8.cos();
        let s = FRAC_PI_8.sin();
        #[rustfmt::skip]
        let expected = [
            c, -s, 0.0,
            s, c, 0.0,
            0.0, 0.0, 1.0,
        ];
        assert_matrix_eq(&mat, &expected);
        Ok(())
    }

    #[test]
    fn scale_by_2() -> Result<(), GeometryError> {
        let fac = MatrixFactory::new(2);
        let mat = fac.scale(&[2.0, 2.0])?;
        #[rustfmt::skip]
        let expected = [
            2.0, 0.0, 0.0,
            0.0, 2.0, 0.0,
            0.0, 0.0, 1.0,
        ];
        assert_matrix_eq(&mat, &expected);
        Ok(())
    }

    #[test]
    fn rotate_euler_rejects_rank_1() {
        let fac = MatrixFactory::new(1);
        assert_eq!(
            fac.rotate_euler(&[0.5]),
            Err(GeometryError::UnsupportedDimension(1))
        );
    }

    #[test]
    fn rotate_euler_rejects_wrong_angle_count() {
        let fac = MatrixFactory::new(3);
        assert_eq!(
            fac.rotate_euler(&[0.5]),
            Err(GeometryError::LengthMismatch {
                dim: 3,
                expected: 3,
                actual: 1,
            })
        );
    }

    #[test]
    fn composition_matches_sequential_application_2d() -> Result<(), GeometryError> {
        let mut rng = StdRng::seed_from_u64(7);
        let fac = MatrixFactory::new(2);
        for _ in 0..100 {
            let a = fac.rotate_euler(&[rng.random_range(-3.0..3.0)])?;
            let b = fac.translate(&[rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0)])?;
            let ab = a.then(&b)?;

            let p = [
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                1.0,
            ];
            let expected = b.transform_point(&a.transform_point(&p)?)?;
            let actual = ab.transform_point(&p)?;
            for (e, x) in expected.iter().zip(actual.iter()) {
                assert_relative_eq!(*e, *x, epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn composition_matches_sequential_application_3d() -> Result<(), GeometryError> {
        let mut rng = StdRng::seed_from_u64(21);
        let fac = MatrixFactory::new(3);
        for _ in 0..100 {
            let a = fac.rotate_euler(&[
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
                rng.random_range(-3.0..3.0),
            ])?;
            let b = fac.scale(&[
                rng.random_range(0.2..4.0),
                rng.random_range(0.2..4.0),
                rng.random_range(0.2..4.0),
            ])?;
            let ab = a.then(&b)?;

            let p = [
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                rng.random_range(-50.0..50.0),
                1.0,
            ];
            let expected = b.transform_point(&a.transform_point(&p)?)?;
            let actual = ab.transform_point(&p)?;
            for (e, x) in expected.iter().zip(actual.iter()) {
                assert_relative_eq!(*e, *x, epsilon = 1e-9);
            }
        }
        Ok(())
    }
}
