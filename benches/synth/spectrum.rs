//! Benchmarks for partial bank generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stretta::spectrum::partial_bank;
use stretta::tuning::Tuning;

pub fn bench_partial_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/partial_bank");

    let cases = [
        ("pure_harmonic", Tuning {
            inharmonicity: 0.0,
            ..Tuning::default()
        }),
        ("stretched", Tuning {
            inharmonicity: 0.01,
            ..Tuning::default()
        }),
        ("19_edo", Tuning {
            divisions: 19,
            ..Tuning::default()
        }),
    ];

    for (name, tuning) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &tuning, |b, tuning| {
            b.iter(|| black_box(partial_bank(black_box(tuning), black_box(64))))
        });
    }

    group.finish();
}
