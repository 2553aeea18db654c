//! Benchmark for chunk building and streaming ticks.
//!
//! TARGET: a full boundary crossing (7 chunks at the defaults) well inside
//! one frame.
//!
//! Run with: cargo bench --package aerie_procedural --bench chunk_benchmark

use aerie_procedural::{
    ChunkBuilder, ChunkCoord, HeightField, NullSurface, StreamingConfig, TerrainStreamer,
    WorldSeed,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn benchmark_single_chunk(c: &mut Criterion) {
    let config = StreamingConfig::default();
    let field = HeightField::new(WorldSeed::new(42), config.noise);
    let builder = ChunkBuilder::new();

    c.bench_function("single_chunk_build_50_segments", |b| {
        let mut cx = 0i32;
        b.iter(|| {
            cx = cx.wrapping_add(1);
            let (x, z) = ChunkCoord::new(cx, cx / 2).origin(config.chunk_size);
            black_box(builder.build(x, z, config.chunk_size, config.segments, &field))
        });
    });
}

fn benchmark_initial_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    group.sample_size(20);
    group.throughput(Throughput::Elements(29));

    group.bench_function("initial_disc_load", |b| {
        b.iter(|| {
            let mut streamer =
                TerrainStreamer::new(StreamingConfig::default(), NullSurface).unwrap();
            black_box(streamer.update(0.0, 0.0))
        });
    });

    group.finish();
}

fn benchmark_boundary_crossing(c: &mut Criterion) {
    let mut streamer = TerrainStreamer::new(StreamingConfig::default(), NullSurface).unwrap();
    streamer.update(0.0, 0.0);

    c.bench_function("boundary_crossing_tick", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 100.0;
            black_box(streamer.update(x, 0.0))
        });
    });
}

fn benchmark_idle_tick(c: &mut Criterion) {
    let mut streamer = TerrainStreamer::new(StreamingConfig::default(), NullSurface).unwrap();
    streamer.update(0.0, 0.0);

    c.bench_function("idle_tick", |b| {
        b.iter(|| black_box(streamer.update(black_box(10.0), 10.0)));
    });
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_initial_load,
    benchmark_boundary_crossing,
    benchmark_idle_tick
);
criterion_main!(benches);
