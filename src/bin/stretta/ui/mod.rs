//! TUI widgets for stretta.
//!
//! The screen is a parameter panel, a drawn keyboard, and two views of the
//! audio tap: an oscilloscope and an FFT spectrum.

mod keyboard;
mod params;
mod spectrum;
mod status;
mod waveform;

pub use keyboard::{key_at, render_keyboard};
pub use params::{render_params, ParamPanel};
pub use spectrum::{render_spectrum, SpectrumAnalyzer};
pub use status::{render_help, render_status};
pub use waveform::render_waveform;

/// Audio visualization buffer size (samples, also the FFT size).
pub const VIS_BUFFER_SIZE: usize = 1024;
