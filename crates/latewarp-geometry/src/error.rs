/// An error type for the geometry module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// Error when an Euler rotation is requested for a rank without one.
    #[error("Euler rotation is not defined for spatial rank {0}, only ranks 2 and 3 are supported")]
    UnsupportedDimension(usize),

    /// Error when a parameter vector does not match the spatial rank.
    #[error("Expected {expected} components for spatial rank {dim}, but got {actual}")]
    LengthMismatch {
        /// The spatial rank of the factory or matrix.
        dim: usize,
        /// Number of components required by the rank.
        expected: usize,
        /// Number of components received.
        actual: usize,
    },

    /// Error when two matrices or a matrix and a point disagree on rank.
    #[error("Spatial rank mismatch: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    /// Error when a matrix has no inverse.
    #[error("Matrix is singular and cannot be inverted")]
    SingularMatrix,

    /// Error when a shape has no spatial axes to enumerate corners for.
    #[error("Shape needs a leading channel axis and at least one spatial axis, got {0} axes")]
    InvalidShape(usize),

    /// Error when a corner set does not have 2^d members.
    #[error("Expected {expected} bounding-box corners for spatial rank {dim}, but got {actual}")]
    InvalidCornerCount {
        /// The spatial rank implied by the shape.
        dim: usize,
        /// The required corner count (2^d).
        expected: usize,
        /// The corner count received.
        actual: usize,
    },
}
