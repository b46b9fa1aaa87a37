/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the sample data does not fill the shape.
    #[error("Data length ({0}) does not match the shape volume ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when a shape has too few axes for an image.
    #[error("Image shape needs a channel axis and at least one spatial axis, got {0} axes")]
    InvalidRank(usize),

    /// Error when a sample type cannot be converted losslessly.
    #[error("Type cast failed")]
    CastError,
}
