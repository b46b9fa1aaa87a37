//! Fan-out over generated sub-samples.

use latewarp_image::NdImage;

use crate::error::TransformError;
use crate::transforms::Transform;

/// Runs a downstream transform over every sub-sample a generator yields
/// from one input, depth first, returning results in yield order.
pub struct MultiSampleTransform<S, T> {
    sampler: S,
    transform: T,
}

impl<S, T> MultiSampleTransform<S, T>
where
    S: FnMut(&NdImage) -> Result<Vec<NdImage>, TransformError>,
    T: Transform,
{
    /// Pair a sub-sample generator with a downstream transform.
    pub fn new(sampler: S, transform: T) -> Self {
        Self { sampler, transform }
    }

    /// Generate sub-samples from the input and push each through the
    /// downstream transform.
    pub fn call(&mut self, img: &NdImage) -> Result<Vec<NdImage>, TransformError> {
        let samples = (self.sampler)(img)?;
        let mut out = Vec::with_capacity(samples.len());
        for sample in samples {
            out.push(self.transform.apply(sample)?);
        }
        Ok(out)
    }
}
