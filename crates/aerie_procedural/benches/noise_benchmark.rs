//! Benchmark for noise and height field sampling.
//!
//! A 50-segment chunk needs 2601 fractal samples.
//!
//! Run with: cargo bench --package aerie_procedural --bench noise_benchmark

use aerie_procedural::{HeightField, HeightSource, NoiseProfile, SimplexNoise, WorldSeed};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("single_noise_sample", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_fractal(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("fractal_4_octaves", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.fractal(black_box(x), black_box(x * 0.7), 4, 0.02, 15.0))
        });
    });
}

fn benchmark_chunk_worth_of_samples(c: &mut Criterion) {
    let field = HeightField::new(WorldSeed::new(42), NoiseProfile::BROAD);

    let mut group = c.benchmark_group("height_field");
    group.throughput(Throughput::Elements(51 * 51));
    group.bench_function("51x51_shaded_samples", |b| {
        b.iter(|| {
            for iz in 0..51 {
                for ix in 0..51 {
                    black_box(field.sample(f64::from(ix) * 2.0, f64::from(iz) * 2.0));
                }
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_fractal,
    benchmark_chunk_worth_of_samples
);
criterion_main!(benches);
