/// Interpolation mode for a resample pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterpMode {
    /// Nearest neighbor interpolation.
    Nearest,
    /// Linear interpolation (bilinear in 2-D, trilinear in 3-D).
    Linear,
}

/// How samples outside the source bounds are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingMode {
    /// Out-of-bounds samples are zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Zeros,

    /// The outermost sample is repeated into the padded region.
    ///
    /// Example: ...d c b a | a a a a...
    Border,

    /// Samples reflect at the boundary, starting with the edge sample.
    ///
    /// Example: ...d c b a | a b c d...
    Reflection,
}

/// Compute device a resample pass runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// CPU device.
    Cpu,
    /// CUDA device with device ID.
    Cuda(usize),
}

impl Device {
    /// Returns true if the device is CPU.
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

/// Computation precision of a resample pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// Single precision.
    F32,
    /// Double precision.
    F64,
}

/// Resample parameters attached to one deferred operation.
///
/// Every field is optional: an unset field is compatible with anything
/// and inherits whatever the surrounding run of operations has
/// accumulated. Two set values are compatible only when equal.
/// `shape_override` is a target-shape hint for downstream operations and
/// the final materialization; it never participates in compatibility.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResampleMeta {
    /// Interpolation mode requested by the operation.
    pub mode: Option<InterpMode>,
    /// Padding mode requested by the operation.
    pub padding_mode: Option<PaddingMode>,
    /// Device the resample should run on.
    pub device: Option<Device>,
    /// Computation precision the resample should use.
    pub dtype: Option<Dtype>,
    /// The operation's output shape, when it differs from the input.
    pub shape_override: Option<Vec<usize>>,
}

/// Per-field three-valued compatibility: unset matches anything, two set
/// values must be equal.
fn field_compatible<T: PartialEq>(current: &Option<T>, incoming: &Option<T>) -> bool {
    match (current, incoming) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

impl ResampleMeta {
    /// Test whether an incoming operation can share a resample pass with
    /// the parameters accumulated so far.
    pub fn is_compatible_with(&self, incoming: &ResampleMeta) -> bool {
        field_compatible(&self.mode, &incoming.mode)
            && field_compatible(&self.padding_mode, &incoming.padding_mode)
            && field_compatible(&self.device, &incoming.device)
            && field_compatible(&self.dtype, &incoming.dtype)
    }

    /// Merge a compatible operation's parameters into the accumulated
    /// state: unset resample fields are filled from `incoming`, already
    /// set ones stay; the newest shape hint wins.
    pub fn absorb(&mut self, incoming: &ResampleMeta) {
        if self.mode.is_none() {
            self.mode = incoming.mode;
        }
        if self.padding_mode.is_none() {
            self.padding_mode = incoming.padding_mode;
        }
        if self.device.is_none() {
            self.device = incoming.device;
        }
        if self.dtype.is_none() {
            self.dtype = incoming.dtype;
        }
        if incoming.shape_override.is_some() {
            self.shape_override = incoming.shape_override.clone();
        }
    }
}
