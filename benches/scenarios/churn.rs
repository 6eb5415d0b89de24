//! Whole note lifecycles against the offline backend.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use stretta::backend::null::NullBackend;
use stretta::synth::Synth;

/// One chord's worth of note-on, note-off, and teardown, at a few
/// polyphony widths.
pub fn bench_note_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/note_churn");
    let keys = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b'];

    for &voices in &[1usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(voices),
            &voices,
            |b, &voices| {
                b.iter(|| {
                    let mut backend = NullBackend::new();
                    let mut synth = Synth::new();

                    for (i, &key) in keys.iter().take(voices).enumerate() {
                        synth
                            .note_on(key, 60 + i as i32, &mut backend)
                            .expect("unbounded backend");
                    }
                    backend.advance(0.5);
                    for &key in keys.iter().take(voices) {
                        synth.note_off(key, &mut backend);
                    }
                    backend.advance(3.0);
                    black_box(backend.events().len())
                })
            },
        );
    }

    group.finish();
}
