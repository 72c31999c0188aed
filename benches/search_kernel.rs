//! Microbenchmarks for the primitives the per-guess body is made of.
//!
//! Run with: cargo bench --bench search_kernel

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use halfloop_attack::cipher::{encrypt, inv_round_no_mc};
use halfloop_attack::linear::{inv_linear_layer, linear_layer};
use halfloop_attack::ByteSet;

fn bench_byteset(c: &mut Criterion) {
    let mut group = c.benchmark_group("byteset");

    let a: ByteSet = (0..=255u8).step_by(3).collect();
    let b: ByteSet = (0..=255u8).step_by(5).collect();

    group.bench_function("shift", |bench| {
        bench.iter(|| black_box(a).shift(black_box(0x5A)))
    });
    group.bench_function("intersect", |bench| {
        bench.iter(|| black_box(a).intersect(black_box(b)))
    });
    group.bench_function("is_empty", |bench| {
        bench.iter(|| black_box(a).intersect(black_box(b)).is_empty())
    });
    group.bench_function("iter", |bench| {
        bench.iter(|| black_box(a).iter().map(u32::from).sum::<u32>())
    });

    group.finish();
}

fn bench_linear_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_layer");

    group.bench_function("forward", |bench| {
        bench.iter(|| linear_layer(black_box(0x123456)))
    });
    group.bench_function("inverse", |bench| {
        bench.iter(|| inv_linear_layer(black_box(0x6936ac)))
    });

    group.finish();
}

fn bench_cipher(c: &mut Criterion) {
    let mut group = c.benchmark_group("cipher");

    group.bench_function("encrypt", |bench| {
        bench.iter(|| {
            encrypt(
                black_box(0x010203),
                black_box(0x2b7e151628aed2a6_abf7158809cf4f3c),
                black_box(0x543bd88000017550),
            )
        })
    });
    group.bench_function("inv_round_no_mc", |bench| {
        bench.iter(|| inv_round_no_mc(black_box(0xf28c1e), black_box(0x9a3c51)))
    });

    group.finish();
}

criterion_group!(benches, bench_byteset, bench_linear_layer, bench_cipher);
criterion_main!(benches);
