#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the geometry module.
pub mod error;

/// bounding-box corner enumeration and propagation.
pub mod extents;

/// affine matrix builders for a fixed spatial rank.
pub mod factory;

/// homogeneous affine matrix type.
pub mod matrix;

pub use error::GeometryError;
pub use extents::{extents_from_shape, shape_from_extents, transform_extents, Extent};
pub use factory::MatrixFactory;
pub use matrix::AffineMatrix;
