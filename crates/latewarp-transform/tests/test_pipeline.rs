use std::cell::{Cell, RefCell};
use std::f64::consts::FRAC_PI_4;

use latewarp_geometry::AffineMatrix;
use latewarp_image::{InterpMode, NdImage, PaddingMode};
use latewarp_transform::transforms::{
    CropPad, Flip, Resize, Rotate, Rotate90, Transform, Translate,
};
use latewarp_transform::{
    apply_pending, AffineResampler, Resample, ResampleError, ResampleParams, TransformError,
};

/// Wraps the reference resampler to record every invocation.
struct CountingResampler {
    inner: AffineResampler,
    calls: Cell<usize>,
    params: RefCell<Vec<ResampleParams>>,
}

impl CountingResampler {
    fn new() -> Self {
        Self {
            inner: AffineResampler,
            calls: Cell::new(0),
            params: RefCell::new(Vec::new()),
        }
    }
}

impl Resample for CountingResampler {
    fn resample(
        &self,
        img: &NdImage,
        matrix: &AffineMatrix,
        params: &ResampleParams,
    ) -> Result<NdImage, ResampleError> {
        self.calls.set(self.calls.get() + 1);
        self.params.borrow_mut().push(params.clone());
        self.inner.resample(img, matrix, params)
    }
}

#[test]
fn compatible_chain_costs_exactly_one_resample() -> Result<(), TransformError> {
    let img = NdImage::from_shape_val(&[1, 32, 32], 1.0)?;

    let img = Rotate::new(vec![FRAC_PI_4]).apply(img)?;
    let img = Translate::new(vec![2.0, -3.0]).apply(img)?;
    let img = Flip::new(vec![0]).apply(img)?;
    let img = Rotate::new(vec![-FRAC_PI_4]).apply(img)?;
    assert_eq!(img.pending().len(), 4);

    let counting = CountingResampler::new();
    let out = apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 1);
    assert!(!out.has_pending());
    Ok(())
}

#[test]
fn each_incompatibility_boundary_adds_one_resample() -> Result<(), TransformError> {
    let img = NdImage::from_shape_val(&[1, 16, 16], 1.0)?;

    let mut linear = Translate::new(vec![1.0, 0.0]);
    linear.mode = Some(InterpMode::Linear);
    let mut nearest = Translate::new(vec![0.0, 1.0]);
    nearest.mode = Some(InterpMode::Nearest);

    // linear, linear | nearest | linear: two boundaries
    let img = linear.apply(img)?;
    let img = linear.apply(img)?;
    let img = nearest.apply(img)?;
    let img = linear.apply(img)?;

    let counting = CountingResampler::new();
    apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 3);
    let params = counting.params.borrow();
    // each call carries the metadata accumulated strictly before its boundary
    assert_eq!(params[0].mode, Some(InterpMode::Linear));
    assert_eq!(params[1].mode, Some(InterpMode::Nearest));
    assert_eq!(params[2].mode, Some(InterpMode::Linear));
    Ok(())
}

#[test]
fn empty_queue_returns_the_input_untouched() -> Result<(), TransformError> {
    let img = NdImage::new(&[1, 4, 4], (0..16).map(|x| x as f32).collect())?;
    let ptr = img.as_slice().as_ptr();

    let counting = CountingResampler::new();
    let out = apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 0);
    assert_eq!(out.as_slice().as_ptr(), ptr);
    Ok(())
}

#[test]
fn shape_flows_across_a_flush_boundary() -> Result<(), TransformError> {
    let img = NdImage::from_shape_val(&[1, 4, 6], 1.0)?;

    // segment one: resize then a quarter turn, shapes chained through hints
    let mut resize = Resize::new(vec![8, 12]);
    resize.mode = Some(InterpMode::Linear);
    let img = resize.apply(img)?;
    let img = Rotate90::new(1).apply(img)?;

    // segment two: a nearest-mode shift forces the flush boundary
    let mut shift = Translate::new(vec![1.0, 0.0]);
    shift.mode = Some(InterpMode::Nearest);
    let img = shift.apply(img)?;

    let counting = CountingResampler::new();
    let out = apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 2);
    assert_eq!(out.shape(), &[1, 12, 8]);
    let params = counting.params.borrow();
    assert_eq!(params[0].target_shape, Some(vec![1, 12, 8]));
    assert_eq!(params[1].target_shape, Some(vec![1, 12, 8]));
    Ok(())
}

#[test]
fn four_quarter_turns_restore_the_image_exactly() -> Result<(), TransformError> {
    let data: Vec<f32> = (0..24).map(|x| x as f32).collect();
    let mut img = NdImage::new(&[1, 4, 6], data.clone())?;

    let mut rot = Rotate90::new(1);
    for _ in 0..4 {
        img = rot.apply(img)?;
    }

    let counting = CountingResampler::new();
    let out = apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 1);
    assert_eq!(out.shape(), &[1, 4, 6]);
    assert_eq!(out.as_slice(), data.as_slice());
    Ok(())
}

#[test]
fn one_quarter_turn_moves_samples_exactly() -> Result<(), TransformError> {
    #[rustfmt::skip]
    let img = NdImage::new(&[1, 2, 3], vec![
        0.0, 1.0, 2.0,
        3.0, 4.0, 5.0,
    ])?;

    let img = Rotate90::new(1).apply(img)?;
    let out = apply_pending(img, &AffineResampler)?;

    // rows become columns: the last column of the source is the first row
    assert_eq!(out.shape(), &[1, 3, 2]);
    assert_eq!(out.as_slice(), &[2.0, 5.0, 1.0, 4.0, 0.0, 3.0]);
    Ok(())
}

#[test]
fn eager_equals_single_entry_deferred_flush() -> Result<(), TransformError> {
    let data: Vec<f32> = (0..144).map(|x| (x % 13) as f32).collect();

    let mut eager = CropPad::new(vec![(2, 10), (-1, 11)]);
    eager.lazy = false;
    let eager_out = eager.apply(NdImage::new(&[1, 12, 12], data.clone())?)?;

    let mut deferred = CropPad::new(vec![(2, 10), (-1, 11)]);
    let queued = deferred.apply(NdImage::new(&[1, 12, 12], data)?)?;
    let deferred_out = apply_pending(queued, &AffineResampler)?;

    assert_eq!(eager_out.shape(), deferred_out.shape());
    assert_eq!(eager_out.as_slice(), deferred_out.as_slice());
    Ok(())
}

#[test]
fn resampler_failure_propagates_unmodified() -> Result<(), TransformError> {
    struct FailingResampler;

    impl Resample for FailingResampler {
        fn resample(
            &self,
            _img: &NdImage,
            _matrix: &AffineMatrix,
            _params: &ResampleParams,
        ) -> Result<NdImage, ResampleError> {
            Err(ResampleError::UnsupportedDimension(9))
        }
    }

    let img = NdImage::from_shape_val(&[1, 8, 8], 0.0)?;
    let img = Flip::new(vec![0]).apply(img)?;

    let result = apply_pending(img, &FailingResampler);
    assert_eq!(
        result.unwrap_err(),
        TransformError::Resample(ResampleError::UnsupportedDimension(9))
    );
    Ok(())
}

#[test]
fn deferred_and_stepwise_rotations_agree_on_shape() -> Result<(), TransformError> {
    // two opposite eighth turns cancel geometrically; the deferred chain
    // composes them into (almost) the identity in a single resample
    let img = NdImage::from_shape_val(&[1, 20, 20], 5.0)?;

    let img = Rotate::new(vec![FRAC_PI_4 / 2.0]).apply(img)?;
    let img = Rotate::new(vec![-FRAC_PI_4 / 2.0]).apply(img)?;

    let counting = CountingResampler::new();
    let out = apply_pending(img, &counting)?;

    assert_eq!(counting.calls.get(), 1);
    assert_eq!(out.shape(), &[1, 20, 20]);
    // interior samples are untouched by the cancelled rotation
    assert_eq!(out.get(&[0, 10, 10]), Some(&5.0));
    Ok(())
}
