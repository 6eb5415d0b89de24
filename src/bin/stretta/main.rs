//! stretta - terminal additive microtonal synthesizer
//!
//! Run with: cargo run
//!
//! Play on the bottom letter row (z/y through ','), or click the drawn
//! keys. Set STRETTA_LOG (e.g. `STRETTA_LOG=debug`) to write a tracing
//! log to stretta.log.

mod app;
mod ui;

use std::io;
use std::sync::Arc;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use app::App;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut terminal = ratatui::init();
    let key_release_events = enable_input_extras();

    let result = App::new(key_release_events)
        .wrap_err("failed to start the audio backend")
        .and_then(|(mut app, _stream)| app.run(&mut terminal));

    disable_input_extras(key_release_events);
    ratatui::restore();
    result
}

/// Mouse capture always; key-release reporting where the terminal
/// implements the kitty keyboard protocol. Returns whether release events
/// will arrive (otherwise the app falls back to hold timers).
fn enable_input_extras() -> bool {
    let _ = execute!(io::stdout(), EnableMouseCapture);

    let supported = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if supported {
        let _ = execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );
    }
    supported
}

fn disable_input_extras(key_release_events: bool) {
    if key_release_events {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = execute!(io::stdout(), DisableMouseCapture);
}

/// File-backed tracing, enabled only by STRETTA_LOG so the TUI stays
/// clean. The variable doubles as the filter directive.
fn init_logging() -> EyreResult<()> {
    let Ok(filter) = std::env::var("STRETTA_LOG") else {
        return Ok(());
    };

    let file = std::fs::File::create("stretta.log").wrap_err("failed to create stretta.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
