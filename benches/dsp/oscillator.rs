//! Benchmarks for the phase-accumulator oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stretta::dsp::{Oscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for waveform in [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ] {
        for &size in BLOCK_SIZES {
            let mut osc = Oscillator::new(440.0, waveform, 48_000.0);
            let mut buffer = vec![0.0f32; size];

            group.bench_with_input(
                BenchmarkId::new(format!("{waveform:?}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        for sample in buffer.iter_mut() {
                            *sample = osc.next_sample();
                        }
                        black_box(&buffer);
                    })
                },
            );
        }
    }

    group.finish();
}
