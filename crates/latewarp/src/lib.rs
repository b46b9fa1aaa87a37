#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use latewarp_geometry as geometry;

#[doc(inline)]
pub use latewarp_image as image;

#[doc(inline)]
pub use latewarp_transform as transform;
