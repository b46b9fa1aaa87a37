use rand::{rngs::StdRng, Rng, SeedableRng};

use latewarp_image::{Dtype, InterpMode, NdImage, PaddingMode};

use super::spatial::{
    Flip, FlipOverrides, Rotate, Rotate90, Rotate90Overrides, RotateOverrides,
};
use super::Transform;
use crate::error::TransformError;

/// Normalize a scalar angle magnitude into a symmetric draw range.
pub fn symmetric_range(value: f64) -> (f64, f64) {
    if value < 0.0 {
        (value, -value)
    } else {
        (-value, value)
    }
}

fn validate_prob(op: &'static str, prob: f64) -> Result<(), TransformError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(TransformError::InvalidConfig {
            op,
            reason: format!("probability must be within [0, 1], got {prob}"),
        });
    }
    Ok(())
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn draw_in(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if lo == hi {
        lo
    } else {
        rng.random_range(lo..hi)
    }
}

/// Parameters for [`RandRotate`].
#[derive(Debug, Clone)]
pub struct RandRotateParams {
    /// Draw range for the first angle, radians.
    pub range_x: (f64, f64),
    /// Draw range for the second angle (3-D only), radians.
    pub range_y: (f64, f64),
    /// Draw range for the third angle (3-D only), radians.
    pub range_z: (f64, f64),
    /// Probability that a call rotates at all.
    pub prob: f64,
    /// Keep the input shape instead of growing to the rotated bounds.
    pub keep_size: bool,
    /// Interpolation mode queued with the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode queued with the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Computation precision queued with the operation.
    pub dtype: Option<Dtype>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
    /// Fixed seed for reproducible draws.
    pub seed: Option<u64>,
}

impl Default for RandRotateParams {
    fn default() -> Self {
        Self {
            range_x: (0.0, 0.0),
            range_y: (0.0, 0.0),
            range_z: (0.0, 0.0),
            prob: 0.1,
            keep_size: true,
            mode: Some(InterpMode::Linear),
            padding_mode: Some(PaddingMode::Border),
            dtype: Some(Dtype::F32),
            lazy: true,
            seed: None,
        }
    }
}

/// Randomized rotation owning its random source.
///
/// Each call draws fresh angles exactly once and delegates to the
/// deterministic [`Rotate`], with identity angles on the no-op branch.
pub struct RandRotate {
    params: RandRotateParams,
    op: Rotate,
    rng: StdRng,
}

impl RandRotate {
    /// Create a randomized rotation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the probability is outside
    /// `[0, 1]` or a draw range is inverted.
    pub fn new(params: RandRotateParams) -> Result<Self, TransformError> {
        validate_prob("rand_rotate", params.prob)?;
        for (name, range) in [
            ("range_x", params.range_x),
            ("range_y", params.range_y),
            ("range_z", params.range_z),
        ] {
            if range.1 < range.0 {
                return Err(TransformError::InvalidConfig {
                    op: "rand_rotate",
                    reason: format!("{name} low bound exceeds high bound: {range:?}"),
                });
            }
        }

        let mut op = Rotate::new(vec![0.0]);
        op.keep_size = params.keep_size;
        op.mode = params.mode;
        op.padding_mode = params.padding_mode;
        op.dtype = params.dtype;
        op.lazy = params.lazy;

        let rng = rng_from_seed(params.seed);
        Ok(Self { params, op, rng })
    }
}

impl Transform for RandRotate {
    fn name(&self) -> &'static str {
        "rand_rotate"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        let dims = img.spatial_dims();
        let active = self.rng.random_bool(self.params.prob);

        // one draw per invocation, used or not
        let x = draw_in(&mut self.rng, self.params.range_x);
        let y = draw_in(&mut self.rng, self.params.range_y);
        let z = draw_in(&mut self.rng, self.params.range_z);

        let angles = match (active, dims) {
            (true, 2) => vec![x],
            (true, _) => vec![x, y, z],
            (false, 2) => vec![0.0],
            (false, _) => vec![0.0; 3],
        };
        self.op.call(
            img,
            &RotateOverrides {
                angles: Some(angles),
                ..Default::default()
            },
        )
    }
}

/// Parameters for [`RandRotate90`].
#[derive(Debug, Clone)]
pub struct RandRotate90Params {
    /// Probability that a call rotates at all.
    pub prob: f64,
    /// Largest number of quarter turns to draw.
    pub max_k: usize,
    /// The spatial plane to rotate in.
    pub plane: (usize, usize),
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
    /// Fixed seed for reproducible draws.
    pub seed: Option<u64>,
}

impl Default for RandRotate90Params {
    fn default() -> Self {
        Self {
            prob: 0.1,
            max_k: 3,
            plane: (0, 1),
            lazy: true,
            seed: None,
        }
    }
}

/// Randomized quarter-turn rotation owning its random source.
pub struct RandRotate90 {
    params: RandRotate90Params,
    op: Rotate90,
    rng: StdRng,
}

impl RandRotate90 {
    /// Create a randomized quarter-turn rotation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the probability is outside
    /// `[0, 1]` or `max_k` is zero.
    pub fn new(params: RandRotate90Params) -> Result<Self, TransformError> {
        validate_prob("rand_rotate90", params.prob)?;
        if params.max_k == 0 {
            return Err(TransformError::InvalidConfig {
                op: "rand_rotate90",
                reason: "max_k must be at least 1".to_string(),
            });
        }

        let mut op = Rotate90::new(0);
        op.plane = params.plane;
        op.lazy = params.lazy;

        let rng = rng_from_seed(params.seed);
        Ok(Self { params, op, rng })
    }
}

impl Transform for RandRotate90 {
    fn name(&self) -> &'static str {
        "rand_rotate90"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        let active = self.rng.random_bool(self.params.prob);
        let k = if active {
            self.rng.random_range(0..self.params.max_k) + 1
        } else {
            0
        };
        self.op.call(
            img,
            &Rotate90Overrides {
                k: Some(k),
                ..Default::default()
            },
        )
    }
}

/// Parameters for [`RandFlip`].
#[derive(Debug, Clone)]
pub struct RandFlipParams {
    /// Probability that a call flips at all.
    pub prob: f64,
    /// Spatial axes to mirror when the draw fires.
    pub axes: Vec<usize>,
    /// Defer evaluation until the queue is flushed.
    pub lazy: bool,
    /// Fixed seed for reproducible draws.
    pub seed: Option<u64>,
}

impl Default for RandFlipParams {
    fn default() -> Self {
        Self {
            prob: 0.1,
            axes: vec![0],
            lazy: true,
            seed: None,
        }
    }
}

/// Randomized flip owning its random source.
pub struct RandFlip {
    params: RandFlipParams,
    op: Flip,
    rng: StdRng,
}

impl RandFlip {
    /// Create a randomized flip.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the probability is outside
    /// `[0, 1]`.
    pub fn new(params: RandFlipParams) -> Result<Self, TransformError> {
        validate_prob("rand_flip", params.prob)?;

        let mut op = Flip::new(params.axes.clone());
        op.lazy = params.lazy;

        let rng = rng_from_seed(params.seed);
        Ok(Self { params, op, rng })
    }
}

impl Transform for RandFlip {
    fn name(&self) -> &'static str {
        "rand_flip"
    }

    fn apply(&mut self, img: NdImage) -> Result<NdImage, TransformError> {
        let active = self.rng.random_bool(self.params.prob);
        let axes = if active {
            self.params.axes.clone()
        } else {
            Vec::new()
        };
        self.op.call(
            img,
            &FlipOverrides {
                axes: Some(axes),
                ..Default::default()
            },
        )
    }
}
