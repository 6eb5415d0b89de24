pub mod backend; // Audio rendering backends (offline + cpal)
pub mod dsp;
pub mod envelope; // ADSR segment planning
pub mod error;
pub mod io;
pub mod spectrum; // Partial bank generation
pub mod synth; // Voice management and polyphony
pub mod tuning; // Microtonal pitch formulas

pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
