//! Benchmarks for envelope planning and level queries.

use std::hint::black_box;

use criterion::Criterion;
use stretta::envelope::{EnvelopeController, EnvelopeTiming};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/envelope");
    let timing = EnvelopeTiming::default();

    group.bench_function("attack_plan", |b| {
        b.iter(|| {
            let mut env = EnvelopeController::new();
            black_box(env.attack(black_box(0.0), black_box(&timing)))
        })
    });

    group.bench_function("level_query_mid_decay", |b| {
        let mut env = EnvelopeController::new();
        let _ = env.attack(0.0, &timing);
        b.iter(|| black_box(env.level_at(black_box(0.1))))
    });

    group.bench_function("full_cycle", |b| {
        b.iter(|| {
            let mut env = EnvelopeController::new();
            let _ = env.attack(0.0, &timing);
            let _ = env.release(1.0, &timing);
            black_box(env.level_at(1.5))
        })
    });

    group.finish();
}
