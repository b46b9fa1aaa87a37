use criterion::{criterion_group, criterion_main, Criterion};

use latewarp_image::NdImage;
use latewarp_transform::transforms::{Rotate, Transform, Zoom};
use latewarp_transform::{apply_pending, AffineResampler};

fn bench_apply(c: &mut Criterion) {
    let img = NdImage::from_shape_val(&[1, 256, 256], 1.0).unwrap();

    c.bench_function("deferred_chain_one_resample", |b| {
        b.iter(|| {
            let mut rotate = Rotate::new(vec![0.4]);
            let mut zoom = Zoom::new(vec![1.2]);
            let queued = zoom.apply(rotate.apply(img.clone()).unwrap()).unwrap();
            apply_pending(queued, &AffineResampler).unwrap()
        })
    });

    c.bench_function("eager_chain_two_resamples", |b| {
        b.iter(|| {
            let mut rotate = Rotate::new(vec![0.4]);
            rotate.lazy = false;
            let mut zoom = Zoom::new(vec![1.2]);
            zoom.lazy = false;
            zoom.apply(rotate.apply(img.clone()).unwrap()).unwrap()
        })
    });
}

criterion_group!(benches, bench_apply);
criterion_main!(benches);
