//! Criterion micro-benchmarks for domain enumeration and rank mapping.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fanout_bench::{grid_domain, line_domain, volume_domain};
use fanout_core::Point;

/// Benchmark: enumerate all 10K points of a 1-D domain.
fn bench_iter_line_10k(c: &mut Criterion) {
    let domain = line_domain().unwrap();
    c.bench_function("iter_line_10k", |b| {
        b.iter(|| {
            for p in domain.iter() {
                black_box(&p);
            }
        });
    });
}

/// Benchmark: enumerate all 10K points of a 100x100 domain.
fn bench_iter_grid_10k(c: &mut Criterion) {
    let domain = grid_domain().unwrap();
    c.bench_function("iter_grid_10k", |b| {
        b.iter(|| {
            for p in domain.iter() {
                black_box(&p);
            }
        });
    });
}

/// Benchmark: enumerate a 22^3 domain.
fn bench_iter_volume(c: &mut Criterion) {
    let domain = volume_domain().unwrap();
    c.bench_function("iter_volume_10k", |b| {
        b.iter(|| black_box(domain.iter().count()));
    });
}

/// Benchmark: rank_of + point_at over 1000 deterministic grid points.
fn bench_rank_roundtrip(c: &mut Criterion) {
    let domain = grid_domain().unwrap();
    let points: Vec<Point> = (0u64..1000)
        .map(|i| {
            let r = (i.wrapping_mul(6364136223846793007) % 100) as i64;
            let col = (i.wrapping_mul(1442695040888963407) % 100) as i64;
            Point::from([r, col])
        })
        .collect();

    c.bench_function("rank_roundtrip_grid_1k", |b| {
        b.iter(|| {
            for p in &points {
                let rank = domain.rank_of(p);
                black_box(rank.and_then(|r| domain.point_at(r)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_iter_line_10k,
    bench_iter_grid_10k,
    bench_iter_volume,
    bench_rank_roundtrip
);
criterion_main!(benches);
