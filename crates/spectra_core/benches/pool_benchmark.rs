//! # Pool Churn Benchmark
//!
//! REQUIREMENTS:
//! - Rent/remove must stay O(1)
//! - 0 allocations once the pool is warm
//!
//! Run with: `cargo bench --package spectra_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spectra_core::{ParticlePool, SimRng};

#[derive(Clone, Copy, Default)]
struct Spark {
    x: f32,
    life: f32,
}

/// Benchmark: fill to capacity, then age and compact until empty.
fn bench_fill_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_and_drain");

    for capacity in [500, 2_000, 8_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let mut pool: ParticlePool<Spark> = ParticlePool::new(capacity);
                let mut rng = SimRng::new(9);
                b.iter(|| {
                    while let Some(h) = pool.rent() {
                        if let Some(s) = pool.get_mut(h) {
                            s.x = rng.unit();
                            s.life = rng.range(0.1, 1.0);
                        }
                    }
                    while !pool.is_empty() {
                        pool.retain_mut(|s| {
                            s.life -= 0.1;
                            s.life > 0.0
                        });
                    }
                    black_box(pool.recycled_count())
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: steady state where a tenth of the pool turns over each pass.
fn bench_steady_churn(c: &mut Criterion) {
    let mut pool: ParticlePool<Spark> = ParticlePool::new(4_000);
    let mut rng = SimRng::new(11);

    c.bench_function("steady_churn_4000", |b| {
        b.iter(|| {
            for _ in 0..400 {
                if let Some(h) = pool.rent() {
                    if let Some(s) = pool.get_mut(h) {
                        s.life = 1.0;
                    }
                }
            }
            pool.retain_mut(|s| {
                s.life -= 0.1;
                s.x += 1.0;
                s.life > 0.05 && s.x.is_finite()
            });
            black_box(pool.len())
        });
    });
}

criterion_group!(benches, bench_fill_and_drain, bench_steady_churn);
criterion_main!(benches);
