// Purpose: voice management and polyphony.
// This layer owns the mutable parameter state and arbitrates note events.

pub mod message;
pub mod registry;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use registry::{KeyId, NoteOutcome, VoiceRegistry};
pub use voice::Voice;

use crate::backend::AudioBackend;
use crate::envelope::{EnvelopeParam, EnvelopeTiming};
use crate::error::Result;
use crate::tuning::{Tuning, TuningParam};

/// The synthesis core behind one performance surface.
///
/// `Synth` is the single owner of the mutable tuning and envelope state;
/// the UI mutates it only through the validated setters (or the message
/// pump), and every voice takes its parameters as snapshots at note-on
/// and note-off time. All methods run on the one logical thread that
/// processes input events.
pub struct Synth {
    tuning: Tuning,
    timing: EnvelopeTiming,
    registry: VoiceRegistry,
}

impl Synth {
    pub fn new() -> Self {
        Self {
            tuning: Tuning::default(),
            timing: EnvelopeTiming::default(),
            registry: VoiceRegistry::new(),
        }
    }

    pub fn with_params(tuning: Tuning, timing: EnvelopeTiming) -> Self {
        Self {
            tuning,
            timing,
            registry: VoiceRegistry::new(),
        }
    }

    pub fn note_on(
        &mut self,
        key: KeyId,
        note: i32,
        backend: &mut dyn AudioBackend,
    ) -> Result<NoteOutcome> {
        self.registry
            .note_on(key, note, self.tuning, &self.timing, backend)
    }

    pub fn note_off(&mut self, key: KeyId, backend: &mut dyn AudioBackend) -> NoteOutcome {
        self.registry.note_off(key, &self.timing, backend)
    }

    pub fn all_notes_off(&mut self, backend: &mut dyn AudioBackend) {
        self.registry.all_notes_off(&self.timing, backend);
    }

    /// Apply a tuning-parameter-changed intent from the UI.
    pub fn set_tuning(&mut self, param: TuningParam, value: f32) -> Result<()> {
        self.tuning.set(param, value)
    }

    /// Apply an envelope-parameter-changed intent from the UI.
    pub fn set_envelope(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        self.timing.set(param, value)
    }

    /// Message-pump form of the event handlers, for queue-driven shells.
    ///
    /// A dropped note (unplayable or backend exhaustion) is reported and
    /// swallowed here: in a realtime context the show goes on.
    pub fn handle_message(&mut self, message: SynthMessage, backend: &mut dyn AudioBackend) {
        let result = match message {
            SynthMessage::NoteOn { key, note } => self.note_on(key, note, backend).map(|_| ()),
            SynthMessage::NoteOff { key } => {
                self.note_off(key, backend);
                Ok(())
            }
            SynthMessage::SetTuning { param, value } => self.set_tuning(param, value),
            SynthMessage::SetEnvelope { param, value } => self.set_envelope(param, value),
            SynthMessage::AllNotesOff => {
                self.all_notes_off(backend);
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::warn!(%err, ?message, "message dropped");
        }
    }

    /// Drain a message queue into the synth.
    pub fn pump(&mut self, rx: &mut impl MessageReceiver, backend: &mut dyn AudioBackend) {
        while let Some(message) = rx.pop() {
            self.handle_message(message, backend);
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn timing(&self) -> &EnvelopeTiming {
        &self.timing
    }

    pub fn active_voices(&self) -> usize {
        self.registry.len()
    }

    pub fn is_live(&self, key: KeyId) -> bool {
        self.registry.is_live(key)
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}
