//! Partial bank generation.
//!
//! A voice's spectrum is a fixed bank of 12 stretched partials. The bank is
//! a pure function of (tuning snapshot, note index): no hidden state, so
//! identical inputs always produce identical banks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tuning::Tuning;

/// Number of partials rendered per voice.
pub const PARTIALS_PER_VOICE: usize = 12;

/// Fixed scale applied to every partial gain so the summed bank stays
/// inside safe output amplitude.
pub const HEADROOM: f32 = 0.08;

/// One sinusoidal component of a voice's spectrum.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Frequency in Hz. Finite, > 0.
    pub frequency: f32,
    /// Linear gain, already scaled by [`HEADROOM`]. Finite, >= 0.
    pub gain: f32,
}

/// A full voice spectrum, ordered by partial index 1..=12.
pub type PartialBank = [Partial; PARTIALS_PER_VOICE];

/// Compute the partial bank for one note under one tuning snapshot.
///
/// `frequency(i) = frequency_for_note(note) * i * stretch_factor(i)`
/// `gain(i)      = rolloff_gain(i) * HEADROOM`
///
/// Any non-finite or non-positive frequency, or non-finite gain, rejects
/// the whole bank: nothing non-finite may reach the backend. Extreme but
/// finite values pass through; the live backend clamps at its own boundary.
pub fn partial_bank(tuning: &Tuning, note: i32) -> Result<PartialBank> {
    let fundamental = tuning.frequency_for_note(note);
    let mut bank = [Partial {
        frequency: 0.0,
        gain: 0.0,
    }; PARTIALS_PER_VOICE];

    for (slot, partial) in bank.iter_mut().zip(1u32..) {
        let frequency = fundamental * partial as f32 * tuning.stretch_factor(partial);
        let gain = tuning.rolloff_gain(partial) * HEADROOM;

        if !frequency.is_finite() || frequency <= 0.0 || !gain.is_finite() {
            return Err(Error::UnplayableNote { note });
        }

        *slot = Partial { frequency, gain };
    }

    Ok(bank)
}
