use crate::error::ImageError;
use crate::meta::Device;
use crate::queue::{PendingEntry, PendingQueue};

/// An N-dimensional image with a queue of not-yet-applied operations.
///
/// Sample data is stored row-major as `f32` with shape
/// `[channels, spatial...]`; the leading axis is never touched by
/// geometric operations. Every image exclusively owns one
/// [`PendingQueue`]; operations append to it and the apply engine
/// clears it after materializing.
///
/// # Examples
///
/// ```
/// use latewarp_image::NdImage;
///
/// let img = NdImage::from_shape_val(&[1, 24, 32], 0.0).unwrap();
///
/// assert_eq!(img.spatial_dims(), 2);
/// assert_eq!(img.spatial_shape(), &[24, 32]);
/// assert!(!img.has_pending());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NdImage {
    data: Vec<f32>,
    shape: Vec<usize>,
    device: Device,
    pending: PendingQueue,
}

impl NdImage {
    /// Create an image from sample data.
    ///
    /// # Arguments
    ///
    /// * `shape` - The image shape as `[channels, spatial...]`.
    /// * `data` - Row-major samples, one per shape element.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape has fewer than two axes or the data
    /// length does not match the shape volume.
    pub fn new(shape: &[usize], data: Vec<f32>) -> Result<Self, ImageError> {
        if shape.len() < 2 {
            return Err(ImageError::InvalidRank(shape.len()));
        }
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(ImageError::InvalidChannelShape(data.len(), numel));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            device: Device::Cpu,
            pending: PendingQueue::new(),
        })
    }

    /// Create an image with every sample set to `val`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape has fewer than two axes.
    pub fn from_shape_val(shape: &[usize], val: f32) -> Result<Self, ImageError> {
        let numel: usize = shape.iter().product();
        Self::new(shape, vec![val; numel])
    }

    /// Move the image to another device tag.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// The full shape, channel axis first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The spatial axes of the shape, channel axis excluded.
    pub fn spatial_shape(&self) -> &[usize] {
        &self.shape[1..]
    }

    /// Number of spatial dimensions.
    pub fn spatial_dims(&self) -> usize {
        self.shape.len() - 1
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.shape[0]
    }

    /// Total number of samples.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The device the image lives on.
    pub fn device(&self) -> Device {
        self.device
    }

    /// The samples as a flat row-major slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The samples as a mutable flat row-major slice.
    pub fn as_slice_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// The sample at a full index, or `None` when out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<&f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (i, (&idx, &size)) in index.iter().zip(self.shape.iter()).enumerate() {
            if idx >= size {
                return None;
            }
            let stride: usize = self.shape[i + 1..].iter().product();
            offset += idx * stride;
        }
        self.data.get(offset)
    }

    /// Copy the samples into a vector of another numeric type.
    ///
    /// # Errors
    ///
    /// Returns an error if a sample cannot be represented in the target
    /// type.
    pub fn to_vec_cast<U>(&self) -> Result<Vec<U>, ImageError>
    where
        U: num_traits::NumCast,
    {
        self.data
            .iter()
            .map(|&x| U::from(x).ok_or(ImageError::CastError))
            .collect()
    }

    /// Whether any operations are queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Append a deferred operation.
    pub fn push_pending(&mut self, entry: PendingEntry) {
        self.pending.push(entry);
    }

    /// Read the most recently queued operation.
    pub fn peek_pending(&self) -> Option<&PendingEntry> {
        self.pending.peek_last()
    }

    /// Drop all queued operations.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// The queue itself, oldest entry first.
    pub fn pending(&self) -> &PendingQueue {
        &self.pending
    }

    /// Detach the queue from the image, leaving it empty.
    pub fn take_pending(&mut self) -> PendingQueue {
        std::mem::take(&mut self.pending)
    }
}
