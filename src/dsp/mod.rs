//! Low-level DSP primitives used by the live audio backend.
//!
//! These components are allocation-free and realtime-safe, making them safe
//! to run directly inside the audio callback. They intentionally stay
//! focused on the per-sample math; resource bookkeeping lives in the
//! backend layer.

/// Phase-accumulator oscillator and waveform shapes.
pub mod oscillator;
/// Linear gain ramp (the backend's parameter interpolation primitive).
pub mod ramp;

pub use oscillator::{Oscillator, Waveform};
pub use ramp::LinearRamp;
