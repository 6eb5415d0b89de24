//! Microtonal tuning model and pitch/partial formulas.
//!
//! The whole pitch system is three numbers: a base frequency, an interval
//! ratio, and how many equal divisions that interval is split into. 12-tone
//! equal temperament is just (440, 2.0, 12); a Bohlen-Pierce scale is
//! (440, 3.0, 13). Two more parameters shape the timbre: `inharmonicity`
//! stretches partials away from exact integer multiples (stiff strings do
//! this physically) and `brightness` controls how fast higher partials
//! roll off in amplitude.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The note index that sounds at exactly `base_frequency`.
/// Matches the MIDI convention of A4 = 69.
pub const REFERENCE_NOTE: i32 = 69;

/// One tuning field, as named by UI parameter-change intents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningParam {
    BaseFrequency,
    IntervalRatio,
    Divisions,
    Inharmonicity,
    Brightness,
}

/// The complete tuning + timbre parameter set.
///
/// `Copy` on purpose: passing a `Tuning` by value into voice construction
/// is the atomic snapshot that keeps a mid-construction parameter change
/// from producing a partial bank mixing old and new values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Frequency of the reference note, Hz. Finite, > 0.
    pub base_frequency: f32,
    /// Ratio spanned by one full interval. Finite, > 0. A ratio of 1
    /// degenerates every pitch to `base_frequency`; that is legal.
    pub interval_ratio: f32,
    /// Equal divisions per interval. Nonzero; negative counts invert the
    /// direction of the scale.
    pub divisions: i32,
    /// Partial stretching coefficient. Finite, >= 0. Zero gives a pure
    /// harmonic series.
    pub inharmonicity: f32,
    /// Amplitude rolloff exponent. Finite, >= 0. Zero gives equal-gain
    /// partials.
    pub brightness: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_frequency: 440.0,
            interval_ratio: 2.0,
            divisions: 12,
            inharmonicity: 0.0001,
            brightness: 1.5,
        }
    }
}

impl Tuning {
    /// Pitch of a note index: `f0 * ratio ^ ((note - 69) / divisions)`.
    ///
    /// The exponent is evaluated in f32 and may be negative or fractional
    /// (any division count other than a divisor of the note offset gives a
    /// non-integer exponent).
    pub fn frequency_for_note(&self, note: i32) -> f32 {
        let exponent = (note - REFERENCE_NOTE) as f32 / self.divisions as f32;
        self.base_frequency * self.interval_ratio.powf(exponent)
    }

    /// Inharmonic stretch for one partial: `sqrt(1 + inharmonicity * i^2)`.
    ///
    /// Always >= 1, exactly 1 when `inharmonicity` is 0, and increasing in
    /// both the coefficient and the partial index.
    pub fn stretch_factor(&self, partial_index: u32) -> f32 {
        let i = partial_index as f32;
        (1.0 + self.inharmonicity * i * i).sqrt()
    }

    /// Amplitude rolloff for one partial: `1 / i^brightness`.
    ///
    /// Strictly decreasing in the index for `brightness > 0`; constant 1.0
    /// at `brightness = 0`. The index starts at 1, so there is no division
    /// by zero to guard.
    pub fn rolloff_gain(&self, partial_index: u32) -> f32 {
        (partial_index as f32).powf(-self.brightness)
    }

    /// Apply one validated parameter-change intent from the UI.
    ///
    /// A rejected value leaves the previous value in place. `Divisions`
    /// arrives as an f32 slider value and is rounded before the nonzero
    /// check.
    pub fn set(&mut self, param: TuningParam, value: f32) -> Result<()> {
        match param {
            TuningParam::BaseFrequency => {
                if !(value.is_finite() && value > 0.0) {
                    return Err(reject("base_frequency", value));
                }
                self.base_frequency = value;
            }
            TuningParam::IntervalRatio => {
                if !(value.is_finite() && value > 0.0) {
                    return Err(reject("interval_ratio", value));
                }
                self.interval_ratio = value;
            }
            TuningParam::Divisions => {
                if !value.is_finite() || value.round() == 0.0 {
                    return Err(reject("divisions", value));
                }
                self.divisions = value.round() as i32;
            }
            TuningParam::Inharmonicity => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(reject("inharmonicity", value));
                }
                self.inharmonicity = value;
            }
            TuningParam::Brightness => {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(reject("brightness", value));
                }
                self.brightness = value;
            }
        }
        Ok(())
    }
}

fn reject(name: &'static str, value: f32) -> Error {
    tracing::warn!(name, value, "rejected tuning parameter");
    Error::InvalidTuningParameter { name, value }
}
