//! Control intents flowing from an input surface to the synth.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::envelope::EnvelopeParam;
use crate::tuning::TuningParam;

/// One control intent. The `key` is the opaque input identifier shared by
/// the keyboard and mouse surfaces; `note` is the tuning-table index.
#[derive(Debug, Copy, Clone)]
pub enum SynthMessage {
    NoteOn { key: char, note: i32 },
    NoteOff { key: char },
    SetTuning { param: TuningParam, value: f32 },
    SetEnvelope { param: EnvelopeParam, value: f32 },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
