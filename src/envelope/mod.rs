//! ADSR envelope planning.
//!
//! Unlike a block-rendering envelope generator, this controller never
//! sample-steps. The backend owns the only clock and the only interpolation
//! primitive (a gain ramp that starts from the current instantaneous
//! value); the controller's job is to compute the correct starting value,
//! target, and duration for each segment, and to answer "what is the level
//! right now" so a re-trigger can start from the in-flight value instead
//! of snapping to zero.
//!
//! The shape is the classic linear ADSR:
//!
//!   Level
//!     1.0 ┐     ╱╲
//!         │    ╱  ╲___________
//!     S   │   ╱               ╲
//!         │  ╱                 ╲
//!     0.0 └─╱───────────────────╲──→ Time
//!         Attack Decay  Sustain  Release
//!
//! Release always starts from the CURRENT level, not the sustain level.
//! This prevents clicks when releasing during attack, and the same rule
//! applied to attack prevents clicks when re-triggering during release.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::MIN_TIME;

/// One envelope field, as named by UI parameter-change intents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeParam {
    Attack,
    Decay,
    Sustain,
    Release,
}

/// ADSR timing parameters, shared by all voices and re-read at attack and
/// release time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTiming {
    /// Seconds to ramp current → 1.0.
    pub attack: f32,
    /// Seconds to ramp 1.0 → sustain.
    pub decay: f32,
    /// Level to hold while the key stays down (0.0 - 1.0).
    pub sustain: f32,
    /// Seconds to ramp current → 0.0.
    pub release: f32,
}

impl Default for EnvelopeTiming {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.5,
            release: 1.5,
        }
    }
}

impl EnvelopeTiming {
    /// Build a sanitized timing: times floored at zero, sustain clamped.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Apply one validated parameter-change intent from the UI.
    pub fn set(&mut self, param: EnvelopeParam, value: f32) -> Result<()> {
        let field = match param {
            EnvelopeParam::Attack => &mut self.attack,
            EnvelopeParam::Decay => &mut self.decay,
            EnvelopeParam::Release => &mut self.release,
            EnvelopeParam::Sustain => {
                if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                    return Err(reject("sustain", value));
                }
                self.sustain = value;
                return Ok(());
            }
        };
        if !(value.is_finite() && value >= 0.0) {
            return Err(reject(param_name(param), value));
        }
        *field = value;
        Ok(())
    }
}

fn param_name(param: EnvelopeParam) -> &'static str {
    match param {
        EnvelopeParam::Attack => "attack",
        EnvelopeParam::Decay => "decay",
        EnvelopeParam::Sustain => "sustain",
        EnvelopeParam::Release => "release",
    }
}

fn reject(name: &'static str, value: f32) -> Error {
    tracing::warn!(name, value, "rejected envelope parameter");
    Error::InvalidEnvelopeParameter { name, value }
}

/// The stage an envelope is in at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Attacking,
    Decaying,
    Sustaining,
    Releasing,
}

/// One planned linear gain segment, handed to the backend's ramp primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    /// Level the segment starts from (informational; the backend ramps
    /// from its own current value, which this mirrors).
    pub from: f32,
    /// Level the segment ends at.
    pub target: f32,
    /// Segment duration, floored at a one-sample minimum so ramp math
    /// never divides by zero.
    pub seconds: f32,
}

/// The two segments planned by an attack: the rise to peak and the fall to
/// the sustain level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackRamps {
    pub rise: Ramp,
    pub fall: Ramp,
}

/// What the controller remembers: the last macro-phase change, with enough
/// of the timing snapshot to interpolate the level at any later instant.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Triggered {
        at: f64,
        from: f32,
        attack: f32,
        decay: f32,
        sustain: f32,
    },
    Released {
        at: f64,
        from: f32,
        release: f32,
    },
}

/// Per-voice envelope state machine.
///
/// `Idle → Attacking → Decaying → Sustaining → Releasing → Idle`, driven
/// by a caller-supplied clock (`now`, seconds, from the backend).
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeController {
    phase: Phase,
}

impl EnvelopeController {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Begin the attack. Legal from Idle or Releasing (re-trigger); any
    /// other stage returns `None` and leaves the phase untouched.
    ///
    /// The rise starts from the level in flight at `now`, so re-attacking
    /// a releasing voice never produces a gain discontinuity.
    pub fn attack(&mut self, now: f64, timing: &EnvelopeTiming) -> Option<AttackRamps> {
        match self.stage_at(now) {
            Stage::Idle | Stage::Releasing => {}
            _ => return None,
        }

        let from = self.level_at(now);
        self.phase = Phase::Triggered {
            at: now,
            from,
            attack: timing.attack,
            decay: timing.decay,
            sustain: timing.sustain,
        };

        Some(AttackRamps {
            rise: Ramp {
                from,
                target: 1.0,
                seconds: timing.attack.max(MIN_TIME),
            },
            fall: Ramp {
                from: 1.0,
                target: timing.sustain,
                seconds: timing.decay.max(MIN_TIME),
            },
        })
    }

    /// Begin the release from whatever the live level is at `now`. Legal
    /// from any non-Idle stage; from Idle returns `None`.
    pub fn release(&mut self, now: f64, timing: &EnvelopeTiming) -> Option<Ramp> {
        if self.stage_at(now) == Stage::Idle {
            return None;
        }

        let from = self.level_at(now);
        self.phase = Phase::Released {
            at: now,
            from,
            release: timing.release,
        };

        Some(Ramp {
            from,
            target: 0.0,
            seconds: timing.release.max(MIN_TIME),
        })
    }

    /// The interpolated level at `now`.
    pub fn level_at(&self, now: f64) -> f32 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Triggered {
                at,
                from,
                attack,
                decay,
                sustain,
            } => {
                let dt = (now - at).max(0.0);
                let attack = attack.max(MIN_TIME) as f64;
                let decay = decay.max(MIN_TIME) as f64;
                if dt < attack {
                    lerp(from, 1.0, dt / attack)
                } else if dt < attack + decay {
                    lerp(1.0, sustain, (dt - attack) / decay)
                } else {
                    sustain
                }
            }
            Phase::Released { at, from, release } => {
                let dt = (now - at).max(0.0);
                let release = release.max(MIN_TIME) as f64;
                if dt < release {
                    lerp(from, 0.0, dt / release)
                } else {
                    0.0
                }
            }
        }
    }

    /// The stage at `now`. Once the release tail has elapsed this reads
    /// Idle without any explicit transition call.
    pub fn stage_at(&self, now: f64) -> Stage {
        match self.phase {
            Phase::Idle => Stage::Idle,
            Phase::Triggered {
                at, attack, decay, ..
            } => {
                let dt = (now - at).max(0.0);
                let attack = attack.max(MIN_TIME) as f64;
                let decay = decay.max(MIN_TIME) as f64;
                if dt < attack {
                    Stage::Attacking
                } else if dt < attack + decay {
                    Stage::Decaying
                } else {
                    Stage::Sustaining
                }
            }
            Phase::Released { at, release, .. } => {
                let dt = (now - at).max(0.0);
                if dt < release.max(MIN_TIME) as f64 {
                    Stage::Releasing
                } else {
                    Stage::Idle
                }
            }
        }
    }
}

impl Default for EnvelopeController {
    fn default() -> Self {
        Self::new()
    }
}

fn lerp(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}
