use criterion::{Criterion, criterion_group, criterion_main};
use kinema::{
    math::Quaternion,
    spatial::{SpatialInertia, SpatialTransform, composite_inertias},
};
use nalgebra::Vector3;
use std::hint::black_box;

pub fn bench_spatial_inertia_transform(c: &mut Criterion) {
    let inertia = SpatialInertia::of_uniform_box(1.0, 2.0, 0.5, 3.0);
    let transform = SpatialTransform::from_quaternion(
        &Quaternion::from_roll_pitch_yaw(0.1, 0.2, 0.3),
        Vector3::new(1.0, -2.0, 0.5),
    );
    c.bench_function("spatial_inertia_transform", |b| {
        b.iter(|| black_box(&inertia).transformed(black_box(&transform)))
    });
}

pub fn bench_composite_inertias_of_chain(c: &mut Criterion) {
    let n_bodies = 1000;
    let parents: Vec<_> = (0..n_bodies).map(|i| i.checked_sub(1)).collect();
    let inertias = vec![SpatialInertia::of_uniform_box(1.0, 1.0, 1.0, 1.0); n_bodies];
    let transforms: Vec<_> = (0..n_bodies)
        .map(|i| {
            SpatialTransform::from_quaternion(
                &Quaternion::from_rotation_z(i as f32 * 1e-2),
                Vector3::x(),
            )
        })
        .collect();
    c.bench_function("composite_inertias_of_chain", |b| {
        b.iter(|| composite_inertias(black_box(&parents), &inertias, &transforms).unwrap())
    });
}

criterion_group!(
    benches,
    bench_spatial_inertia_transform,
    bench_composite_inertias_of_chain
);
criterion_main!(benches);
