//! Benchmarks for the linear gain ramp.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stretta::dsp::LinearRamp;

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");

    for &size in BLOCK_SIZES {
        // Mid-ramp: the interpolating path.
        let mut ramp = LinearRamp::new(0.0, 48_000.0);
        ramp.ramp_to(1.0, 10.0);
        group.bench_with_input(BenchmarkId::new("ramping", size), &size, |b, _| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(ramp.next_sample());
                }
            })
        });

        // Settled: the hold path.
        let mut ramp = LinearRamp::new(0.7, 48_000.0);
        group.bench_with_input(BenchmarkId::new("settled", size), &size, |b, _| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(ramp.next_sample());
                }
            })
        });
    }

    group.finish();
}
