use crate::error::GeometryError;

/// A homogeneous affine transform over `d` spatial dimensions.
///
/// The matrix is stored row-major as a dense `(d + 1) x (d + 1)` block of
/// `f64` and is immutable: composition and inversion return new matrices.
/// Points are treated as column vectors with a trailing homogeneous `1`.
///
/// # Examples
///
/// ```
/// use latewarp_geometry::MatrixFactory;
///
/// let fac = MatrixFactory::new(2);
/// let t = fac.translate(&[2.0, 3.0]).unwrap();
/// let p = t.transform_point(&[1.0, 1.0, 1.0]).unwrap();
///
/// assert_eq!(p, vec![3.0, 4.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMatrix {
    data: Vec<f64>,
    dim: usize,
}

impl AffineMatrix {
    /// Create a matrix from row-major data for the given spatial rank.
    ///
    /// # Arguments
    ///
    /// * `dim` - The spatial rank `d`; the matrix is `(d + 1) x (d + 1)`.
    /// * `data` - Row-major elements, `(d + 1) * (d + 1)` of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length does not match the rank.
    pub fn from_rows(dim: usize, data: Vec<f64>) -> Result<Self, GeometryError> {
        let n = dim + 1;
        if data.len() != n * n {
            return Err(GeometryError::LengthMismatch {
                dim,
                expected: n * n,
                actual: data.len(),
            });
        }
        Ok(Self { data, dim })
    }

    /// The spatial rank `d` of the transform.
    pub fn spatial_dims(&self) -> usize {
        self.dim
    }

    /// The side length of the homogeneous matrix, `d + 1`.
    pub fn size(&self) -> usize {
        self.dim + 1
    }

    /// The element at the given row and column.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size() + col]
    }

    /// The row-major elements of the matrix.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Compose this transform with one applied after it.
    ///
    /// `a.then(&b)` is the transform whose effect on a point equals
    /// applying `a` first and `b` second. The returned matrix is the
    /// product `b * a`; the ordering is load-bearing for every pipeline
    /// with more than one operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the two matrices disagree on spatial rank.
    pub fn then(&self, later: &AffineMatrix) -> Result<AffineMatrix, GeometryError> {
        if self.dim != later.dim {
            return Err(GeometryError::DimensionMismatch(self.dim, later.dim));
        }
        let n = self.size();
        let mut out = vec![0.0; n * n];
        for r in 0..n {
            for c in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += later.data[r * n + k] * self.data[k * n + c];
                }
                out[r * n + c] = acc;
            }
        }
        Ok(AffineMatrix {
            data: out,
            dim: self.dim,
        })
    }

    /// Apply the transform to a homogeneous point.
    ///
    /// # Arguments
    ///
    /// * `point` - A `(d + 1)`-component column vector with trailing `1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the point length does not match the rank.
    pub fn transform_point(&self, point: &[f64]) -> Result<Vec<f64>, GeometryError> {
        let n = self.size();
        if point.len() != n {
            return Err(GeometryError::LengthMismatch {
                dim: self.dim,
                expected: n,
                actual: point.len(),
            });
        }
        let mut out = vec![0.0; n];
        for (r, o) in out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, p) in point.iter().enumerate() {
                acc += self.data[r * n + k] * p;
            }
            *o = acc;
        }
        Ok(out)
    }

    /// Invert the transform by Gauss-Jordan elimination with partial pivoting.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularMatrix`] if no inverse exists.
    pub fn inverse(&self) -> Result<AffineMatrix, GeometryError> {
        let n = self.size();
        let mut a = self.data.clone();
        let mut inv = vec![0.0; n * n];
        for i in 0..n {
            inv[i * n + i] = 1.0;
        }

        for col in 0..n {
            // pick the largest pivot in this column
            let mut pivot = col;
            for r in col + 1..n {
                if a[r * n + col].abs() > a[pivot * n + col].abs() {
                    pivot = r;
                }
            }
            if a[pivot * n + col].abs() < 1e-12 {
                return Err(GeometryError::SingularMatrix);
            }
            if pivot != col {
                for c in 0..n {
                    a.swap(col * n + c, pivot * n + c);
                    inv.swap(col * n + c, pivot * n + c);
                }
            }

            let diag = a[col * n + col];
            for c in 0..n {
                a[col * n + c] /= diag;
                inv[col * n + c] /= diag;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[r * n + col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    a[r * n + c] -= factor * a[col * n + c];
                    inv[r * n + c] -= factor * inv[col * n + c];
                }
            }
        }

        Ok(AffineMatrix {
            data: inv,
            dim: self.dim,
        })
    }
}
