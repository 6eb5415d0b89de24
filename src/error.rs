//! Error types for stretta.

use thiserror::Error;

/// Result type alias for stretta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the synthesis core.
#[derive(Debug, Error)]
pub enum Error {
    /// A tuning setter rejected a value. The previous value stays in effect.
    #[error("invalid tuning parameter {name}: {value}")]
    InvalidTuningParameter { name: &'static str, value: f32 },

    /// An envelope setter rejected a value. The previous value stays in effect.
    #[error("invalid envelope parameter {name}: {value}")]
    InvalidEnvelopeParameter { name: &'static str, value: f32 },

    /// The partial bank for a note came out non-finite or non-positive.
    /// The note-on is dropped; nothing reaches the backend.
    #[error("note {note} produces an unplayable partial bank")]
    UnplayableNote { note: i32 },

    /// The audio backend could not provide a resource.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Errors raised at the audio backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No free oscillator slots left.
    #[error("source capacity exhausted ({capacity} in use)")]
    SourcesExhausted { capacity: usize },

    /// No free envelope slots left.
    #[error("envelope capacity exhausted ({capacity} in use)")]
    EnvelopesExhausted { capacity: usize },

    /// The audio device failed to open or configure.
    #[error("audio device error: {0}")]
    Device(String),
}
