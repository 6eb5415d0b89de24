//! One sounding note: a partial bank, an envelope, and the backend
//! resources that render them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::{AudioBackend, EnvelopeHandle, SourceHandle, Waveform};
use crate::envelope::{EnvelopeController, EnvelopeTiming};
use crate::error::Result;
use crate::spectrum::{partial_bank, PartialBank, PARTIALS_PER_VOICE};
use crate::tuning::Tuning;

/// Seconds added past the release tail before resources are disposed,
/// so an in-progress ramp is never cut audibly.
pub const TEARDOWN_MARGIN: f64 = 1.0;

/// A voice owns one backend source per partial plus one shared envelope
/// stage. The handles are released together, exactly once, by a teardown
/// task scheduled at release time; after the registry forgets the voice,
/// that task is the only thing keeping the resources alive.
pub struct Voice {
    note: i32,
    partials: PartialBank,
    envelope: EnvelopeController,
    sources: Vec<SourceHandle>,
    envelope_handle: EnvelopeHandle,
    released: Arc<AtomicBool>,
}

impl Voice {
    /// Compute the spectrum for `note` under the given tuning snapshot and
    /// acquire backend resources for it: one started-but-silent source per
    /// partial, all routed through a zeroed envelope stage.
    ///
    /// `tuning` is taken by value; the bank can never mix parameters from
    /// before and after a concurrent UI change. If any allocation fails,
    /// everything acquired so far is disposed before the error propagates.
    pub fn build(
        note: i32,
        tuning: Tuning,
        timing: &EnvelopeTiming,
        backend: &mut dyn AudioBackend,
    ) -> Result<Self> {
        let partials = partial_bank(&tuning, note)?;

        let envelope_handle = backend.create_envelope(*timing)?;
        backend.set_gain(envelope_handle, 0.0);

        let mut sources = Vec::with_capacity(PARTIALS_PER_VOICE);
        for partial in &partials {
            match backend.create_source(partial.frequency, partial.gain, Waveform::Sine) {
                Ok(handle) => sources.push(handle),
                Err(err) => {
                    for handle in sources {
                        backend.dispose_source(handle);
                    }
                    backend.dispose_envelope(envelope_handle);
                    return Err(err.into());
                }
            }
        }

        for &source in &sources {
            backend.connect(source, envelope_handle);
            backend.start_source(source);
        }

        Ok(Self {
            note,
            partials,
            envelope: EnvelopeController::new(),
            sources,
            envelope_handle,
            released: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the attack: ramp to peak now, and schedule the decay segment
    /// one attack-length out. The scheduled decay checks the released flag
    /// first, so a release issued in the meantime wins over it.
    pub fn trigger_attack(&mut self, timing: &EnvelopeTiming, backend: &mut dyn AudioBackend) {
        let now = backend.now();
        let Some(plan) = self.envelope.attack(now, timing) else {
            return;
        };

        backend.ramp_gain(self.envelope_handle, plan.rise.target, plan.rise.seconds);

        let envelope_handle = self.envelope_handle;
        let released = self.released.clone();
        let fall = plan.fall;
        backend.schedule(
            plan.rise.seconds as f64,
            Box::new(move |backend| {
                if !released.load(Ordering::SeqCst) {
                    backend.ramp_gain(envelope_handle, fall.target, fall.seconds);
                }
            }),
        );
    }

    /// Release from the current level and schedule teardown past the tail.
    ///
    /// Idempotent: the second and later calls return immediately, so the
    /// teardown can never be double-scheduled. The teardown task takes the
    /// handles with it and disposes each exactly once, regardless of what
    /// has happened to the registry entry or the `Voice` value since.
    pub fn trigger_release(&mut self, timing: &EnvelopeTiming, backend: &mut dyn AudioBackend) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        let now = backend.now();
        let tail_seconds = match self.envelope.release(now, timing) {
            Some(ramp) => {
                backend.ramp_gain(self.envelope_handle, ramp.target, ramp.seconds);
                ramp.seconds as f64
            }
            // Built but never attacked; nothing is audible, dispose after
            // the margin alone.
            None => 0.0,
        };

        let sources = std::mem::take(&mut self.sources);
        let envelope_handle = self.envelope_handle;
        backend.schedule(
            tail_seconds + TEARDOWN_MARGIN,
            Box::new(move |backend| {
                for handle in sources {
                    backend.dispose_source(handle);
                }
                backend.dispose_envelope(envelope_handle);
            }),
        );

        tracing::debug!(note = self.note, "voice released");
    }

    pub fn note(&self) -> i32 {
        self.note
    }

    pub fn partials(&self) -> &PartialBank {
        &self.partials
    }

    pub fn envelope(&self) -> &EnvelopeController {
        &self.envelope
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::{BackendEvent, NullBackend};
    use crate::error::{BackendError, Error};

    fn timing() -> EnvelopeTiming {
        EnvelopeTiming::new(0.01, 0.3, 0.5, 1.5)
    }

    fn build_voice(backend: &mut NullBackend) -> Voice {
        Voice::build(69, Tuning::default(), &timing(), backend).unwrap()
    }

    #[test]
    fn build_wires_twelve_sources_through_one_envelope() {
        let mut backend = NullBackend::new();
        let voice = build_voice(&mut backend);

        assert_eq!(backend.live_sources(), PARTIALS_PER_VOICE);
        assert_eq!(backend.live_envelopes(), 1);
        assert_eq!(voice.partials().len(), PARTIALS_PER_VOICE);

        let connects = backend
            .events()
            .iter()
            .filter(|e| matches!(e, BackendEvent::Connect { .. }))
            .count();
        let starts = backend
            .events()
            .iter()
            .filter(|e| matches!(e, BackendEvent::StartSource { .. }))
            .count();
        assert_eq!(connects, PARTIALS_PER_VOICE);
        assert_eq!(starts, PARTIALS_PER_VOICE);
    }

    #[test]
    fn build_starts_silent() {
        let mut backend = NullBackend::new();
        build_voice(&mut backend);

        // The envelope is zeroed before any source starts, and no ramp has
        // been issued yet.
        let first_gain_or_start = backend.events().iter().find(|e| {
            matches!(
                e,
                BackendEvent::SetGain { .. }
                    | BackendEvent::RampGain { .. }
                    | BackendEvent::StartSource { .. }
            )
        });
        assert!(matches!(
            first_gain_or_start,
            Some(BackendEvent::SetGain { value, .. }) if *value == 0.0
        ));
    }

    #[test]
    fn build_passes_partial_frequencies_and_gains_through() {
        let mut backend = NullBackend::new();
        let voice = build_voice(&mut backend);

        let created: Vec<(f32, f32)> = backend
            .events()
            .iter()
            .filter_map(|e| match e {
                BackendEvent::CreateSource {
                    frequency, gain, ..
                } => Some((*frequency, *gain)),
                _ => None,
            })
            .collect();

        assert_eq!(created.len(), PARTIALS_PER_VOICE);
        for (partial, (frequency, gain)) in voice.partials().iter().zip(created) {
            assert_eq!(partial.frequency, frequency);
            assert_eq!(partial.gain, gain);
        }
    }

    #[test]
    fn attack_ramps_to_peak_then_schedules_decay() {
        let mut backend = NullBackend::new();
        let mut voice = build_voice(&mut backend);
        voice.trigger_attack(&timing(), &mut backend);

        assert!(backend.events().iter().any(|e| matches!(
            e,
            BackendEvent::RampGain { target, .. } if *target == 1.0
        )));
        assert_eq!(backend.pending_tasks(), 1);

        // The decay fires once the attack has elapsed.
        backend.advance(0.02);
        assert!(backend.events().iter().any(|e| matches!(
            e,
            BackendEvent::RampGain { target, .. } if *target == 0.5
        )));
    }

    #[test]
    fn release_wins_over_a_pending_decay() {
        let mut backend = NullBackend::new();
        let mut voice = build_voice(&mut backend);
        voice.trigger_attack(&timing(), &mut backend);

        // Release while the decay task is still queued.
        voice.trigger_release(&timing(), &mut backend);
        backend.advance(0.02);

        let decay_ramps = backend
            .events()
            .iter()
            .filter(|e| matches!(e, BackendEvent::RampGain { target, .. } if *target == 0.5))
            .count();
        assert_eq!(decay_ramps, 0, "stale decay must not fire after release");
    }

    #[test]
    fn release_disposes_after_the_tail_plus_margin() {
        let mut backend = NullBackend::new();
        let mut voice = build_voice(&mut backend);
        voice.trigger_attack(&timing(), &mut backend);
        backend.advance(1.0);
        voice.trigger_release(&timing(), &mut backend);

        // Tail is 1.5s, margin 1.0s: still allocated just before the
        // deadline, gone just after.
        backend.advance(2.4);
        assert_eq!(backend.live_sources(), PARTIALS_PER_VOICE);
        assert_eq!(backend.live_envelopes(), 1);

        backend.advance(0.2);
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(backend.live_envelopes(), 0);
    }

    #[test]
    fn double_release_disposes_exactly_once() {
        let mut backend = NullBackend::new();
        let mut voice = build_voice(&mut backend);
        voice.trigger_attack(&timing(), &mut backend);

        voice.trigger_release(&timing(), &mut backend);
        voice.trigger_release(&timing(), &mut backend);
        backend.advance(10.0);

        let disposals = backend
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BackendEvent::DisposeSource { .. } | BackendEvent::DisposeEnvelope { .. }
                )
            })
            .count();
        assert_eq!(disposals, PARTIALS_PER_VOICE + 1);
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(backend.live_envelopes(), 0);
    }

    #[test]
    fn failed_build_leaks_nothing() {
        // Room for the envelope but only five of twelve sources.
        let mut backend = NullBackend::with_capacity(5, 8);
        let result = Voice::build(69, Tuning::default(), &timing(), &mut backend);

        assert!(matches!(
            result,
            Err(Error::Backend(BackendError::SourcesExhausted { .. }))
        ));
        assert_eq!(backend.live_sources(), 0);
        assert_eq!(backend.live_envelopes(), 0);
    }

    #[test]
    fn unplayable_note_fails_before_any_allocation() {
        let mut backend = NullBackend::new();
        let tuning = Tuning {
            base_frequency: f32::MAX,
            divisions: 1,
            ..Tuning::default()
        };
        assert!(Voice::build(120, tuning, &timing(), &mut backend).is_err());
        assert!(backend.events().is_empty());
    }
}
