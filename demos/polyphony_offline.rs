//! Offline polyphony walkthrough: drives the synth against the recording
//! backend and prints the command timeline, no audio device needed.
//!
//! Run with: cargo run --example polyphony_offline

use stretta::backend::null::NullBackend;
use stretta::synth::{Synth, SynthMessage};

fn main() {
    let mut backend = NullBackend::new();
    let mut synth = Synth::new();

    let script: &[(f64, SynthMessage)] = &[
        (0.0, SynthMessage::NoteOn { key: 'z', note: 60 }),
        (0.25, SynthMessage::NoteOn { key: 'c', note: 64 }),
        (0.5, SynthMessage::NoteOn { key: 'b', note: 67 }),
        (1.5, SynthMessage::NoteOff { key: 'z' }),
        // Re-attack inside the release tail: a second, independent voice.
        (1.7, SynthMessage::NoteOn { key: 'z', note: 60 }),
        (2.5, SynthMessage::AllNotesOff),
    ];

    let mut clock = 0.0;
    for &(at, message) in script {
        backend.advance(at - clock);
        clock = at;
        println!(
            "t={at:4.2}s  {message:?}  (voices: {})",
            synth.active_voices()
        );
        synth.handle_message(message, &mut backend);
    }

    println!(
        "\nafter the script: {} live sources, {} live envelopes, {} pending teardowns",
        backend.live_sources(),
        backend.live_envelopes(),
        backend.pending_tasks()
    );

    backend.advance(5.0);
    println!(
        "after the tails:  {} live sources, {} live envelopes ({} backend events total)",
        backend.live_sources(),
        backend.live_envelopes(),
        backend.events().len()
    );
}
