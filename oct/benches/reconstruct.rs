use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use oct::{reconstruct, simulate, SimulationParams};
use shared::{Length, LengthExt};

fn make_acquisition(samples: usize, nx: usize, ny: usize) -> (oct::Interferogram, shared::Dimensions) {
    let params = SimulationParams {
        number_of_spectral_bands: samples,
        pixel_size: Length::from_micrometers(2.0),
        ..Default::default()
    };
    let volume = Array3::from_shape_fn((samples / 2, nx, ny), |(z, x, y)| {
        if z == 40 + (x + y) % 60 {
            1.0
        } else {
            0.0
        }
    });
    simulate(&volume, &params).expect("simulation parameters are valid")
}

fn bench_reconstruct(c: &mut Criterion) {
    let (bscan, bscan_dims) = make_acquisition(2048, 256, 1);
    let (volume, volume_dims) = make_acquisition(1024, 64, 64);

    let mut group = c.benchmark_group("reconstruct");
    group.bench_function("2048x256_bscan", |b| {
        b.iter(|| reconstruct(black_box(&bscan), black_box(&bscan_dims), 0.0, 1.0))
    });
    group.bench_function("2048x256_bscan_dispersion", |b| {
        b.iter(|| reconstruct(black_box(&bscan), black_box(&bscan_dims), 2.5e6, 1.0))
    });
    group.bench_function("1024x64x64_volume", |b| {
        b.iter(|| reconstruct(black_box(&volume), black_box(&volume_dims), 0.0, 1.33))
    });
    group.finish();
}

fn bench_simulate(c: &mut Criterion) {
    let params = SimulationParams {
        number_of_spectral_bands: 2048,
        ..Default::default()
    };
    let volume = Array3::from_shape_fn((1024, 256, 1), |(z, _, _)| if z == 300 { 1.0 } else { 0.0 });

    let mut group = c.benchmark_group("simulate");
    group.bench_function("2048x256_bscan", |b| {
        b.iter(|| simulate(black_box(&volume), black_box(&params)))
    });
    group.finish();
}

criterion_group!(benches, bench_reconstruct, bench_simulate);
criterion_main!(benches);
