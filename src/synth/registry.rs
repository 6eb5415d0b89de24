//! Key → voice arbitration.
//!
//! At most one live voice per input identifier. Note-on for a key that is
//! already sounding is a no-op (key repeat must not retrigger); note-off
//! removes the entry *before* releasing the voice, so a fresh note-on for
//! the same key can start immediately while the old voice rings out on
//! its own teardown timer.

use std::collections::HashMap;

use crate::backend::AudioBackend;
use crate::envelope::EnvelopeTiming;
use crate::error::Result;
use crate::synth::voice::Voice;
use crate::tuning::Tuning;

/// The opaque input identifier shared by keyboard and mouse surfaces.
pub type KeyId = char;

/// What a note event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    /// A fresh voice was built and attacked.
    Started,
    /// The key already had a live voice; nothing happened.
    AlreadySounding,
    /// The key's voice was removed and released.
    Released,
    /// No voice was registered for the key; nothing happened.
    Ignored,
}

/// Mapping from input identifier to its live voice.
#[derive(Default)]
pub struct VoiceRegistry {
    voices: HashMap<KeyId, Voice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self {
            voices: HashMap::new(),
        }
    }

    /// Handle a note-on intent for `key`.
    ///
    /// A failed voice build propagates for this note only and leaves no
    /// entry behind for the key.
    pub fn note_on(
        &mut self,
        key: KeyId,
        note: i32,
        tuning: Tuning,
        timing: &EnvelopeTiming,
        backend: &mut dyn AudioBackend,
    ) -> Result<NoteOutcome> {
        if self.voices.contains_key(&key) {
            return Ok(NoteOutcome::AlreadySounding);
        }

        let mut voice = Voice::build(note, tuning, timing, backend)?;
        voice.trigger_attack(timing, backend);
        self.voices.insert(key, voice);

        tracing::debug!(%key, note, "note on");
        Ok(NoteOutcome::Started)
    }

    /// Handle a note-off intent for `key`. Redundant note-offs (mouse-leave
    /// after mouse-up, say) land on an empty entry and are ignored.
    pub fn note_off(
        &mut self,
        key: KeyId,
        timing: &EnvelopeTiming,
        backend: &mut dyn AudioBackend,
    ) -> NoteOutcome {
        let Some(mut voice) = self.voices.remove(&key) else {
            return NoteOutcome::Ignored;
        };

        voice.trigger_release(timing, backend);
        tracing::debug!(%key, "note off");
        NoteOutcome::Released
    }

    /// Release and remove every live voice.
    pub fn all_notes_off(&mut self, timing: &EnvelopeTiming, backend: &mut dyn AudioBackend) {
        for (_, mut voice) in self.voices.drain() {
            voice.trigger_release(timing, backend);
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn is_live(&self, key: KeyId) -> bool {
        self.voices.contains_key(&key)
    }

    pub fn voice(&self, key: KeyId) -> Option<&Voice> {
        self.voices.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::{BackendEvent, NullBackend};
    use crate::spectrum::PARTIALS_PER_VOICE;

    fn timing() -> EnvelopeTiming {
        EnvelopeTiming::new(0.01, 0.3, 0.5, 1.5)
    }

    #[test]
    fn key_repeat_note_on_is_a_no_op() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();
        let tuning = Tuning::default();

        let first = registry
            .note_on('a', 60, tuning, &timing(), &mut backend)
            .unwrap();
        let second = registry
            .note_on('a', 60, tuning, &timing(), &mut backend)
            .unwrap();

        assert_eq!(first, NoteOutcome::Started);
        assert_eq!(second, NoteOutcome::AlreadySounding);
        assert_eq!(registry.len(), 1);
        // No duplicate allocation happened either.
        assert_eq!(backend.live_sources(), PARTIALS_PER_VOICE);
    }

    #[test]
    fn redundant_note_off_is_a_no_op() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();

        registry
            .note_on('a', 60, Tuning::default(), &timing(), &mut backend)
            .unwrap();
        assert_eq!(
            registry.note_off('a', &timing(), &mut backend),
            NoteOutcome::Released
        );
        assert_eq!(
            registry.note_off('a', &timing(), &mut backend),
            NoteOutcome::Ignored
        );

        backend.advance(10.0);
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(backend.live_envelopes(), 0);
    }

    #[test]
    fn note_off_for_unknown_key_is_ignored() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();
        assert_eq!(
            registry.note_off('q', &timing(), &mut backend),
            NoteOutcome::Ignored
        );
        assert!(backend.events().is_empty());
    }

    #[test]
    fn reattack_during_release_starts_an_independent_voice() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();
        let tuning = Tuning::default();

        registry
            .note_on('a', 60, tuning, &timing(), &mut backend)
            .unwrap();
        backend.advance(1.0);
        registry.note_off('a', &timing(), &mut backend);

        // Before the old voice's tail has elapsed, the key starts again.
        registry
            .note_on('a', 60, tuning, &timing(), &mut backend)
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(backend.live_sources(), 2 * PARTIALS_PER_VOICE);

        // The old voice's teardown is unaffected by the newcomer: exactly
        // one voice's worth of resources goes away at its deadline.
        backend.advance(3.0);
        assert_eq!(backend.live_sources(), PARTIALS_PER_VOICE);
        assert_eq!(backend.live_envelopes(), 1);
        assert!(registry.is_live('a'));
    }

    #[test]
    fn failed_build_leaves_the_registry_clean() {
        // One full voice fits; the second note-on runs out of sources.
        let mut backend = NullBackend::with_capacity(PARTIALS_PER_VOICE + 5, 8);
        let mut registry = VoiceRegistry::new();
        let tuning = Tuning::default();

        registry
            .note_on('a', 60, tuning, &timing(), &mut backend)
            .unwrap();
        assert!(registry
            .note_on('s', 61, tuning, &timing(), &mut backend)
            .is_err());

        assert!(!registry.is_live('s'));
        assert_eq!(registry.len(), 1);
        // The failed attempt disposed its partial allocation.
        assert_eq!(backend.live_sources(), PARTIALS_PER_VOICE);

        // The key is not poisoned: once capacity frees up it can start.
        registry.note_off('a', &timing(), &mut backend);
        backend.advance(10.0);
        assert_eq!(
            registry
                .note_on('s', 61, tuning, &timing(), &mut backend)
                .unwrap(),
            NoteOutcome::Started
        );
    }

    #[test]
    fn voices_snapshot_the_tuning_at_construction() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();
        let mut tuning = Tuning::default();

        registry
            .note_on('a', 69, tuning, &timing(), &mut backend)
            .unwrap();
        let before = registry.voice('a').unwrap().partials()[0].frequency;

        // A UI change after construction must not touch the live voice.
        tuning.base_frequency = 220.0;
        registry
            .note_on('s', 69, tuning, &timing(), &mut backend)
            .unwrap();

        assert_eq!(registry.voice('a').unwrap().partials()[0].frequency, before);
        assert_eq!(
            registry.voice('s').unwrap().partials()[0].frequency,
            220.0
        );
    }

    #[test]
    fn all_notes_off_releases_everything() {
        let mut backend = NullBackend::new();
        let mut registry = VoiceRegistry::new();
        let tuning = Tuning::default();

        for (key, note) in [('a', 60), ('s', 61), ('d', 62)] {
            registry
                .note_on(key, note, tuning, &timing(), &mut backend)
                .unwrap();
        }
        registry.all_notes_off(&timing(), &mut backend);

        assert!(registry.is_empty());
        backend.advance(10.0);
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(backend.live_envelopes(), 0);

        let ramps_to_zero = backend
            .events()
            .iter()
            .filter(|e| matches!(e, BackendEvent::RampGain { target, .. } if *target == 0.0))
            .count();
        assert_eq!(ramps_to_zero, 3);
    }
}
