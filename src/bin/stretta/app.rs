//! Application wiring: input events in, synth commands out, frames drawn.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use stretta::backend::live::LiveBackend;
use stretta::io::keymap::note_for_key;
use stretta::synth::Synth;

use super::ui::{
    key_at, render_help, render_keyboard, render_params, render_spectrum, render_status,
    render_waveform, ParamPanel, SpectrumAnalyzer, VIS_BUFFER_SIZE,
};

/// Without key-release reporting, a held key is kept alive by its repeat
/// events and auto-released this long after they stop.
const HOLD_TIMEOUT: Duration = Duration::from_millis(750);

pub struct App {
    synth: Synth,
    backend: LiveBackend,
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    panel: ParamPanel,
    keyboard_area: Rect,
    /// Fallback hold timers, used only when the terminal cannot report
    /// key releases.
    held_keys: HashMap<char, Instant>,
    key_release_events: bool,
    /// The drawn key currently held by the mouse button, if any.
    mouse_key: Option<char>,
    should_quit: bool,
}

impl App {
    /// Start the live backend and build the app around it. The returned
    /// stream must stay alive for as long as the app runs.
    pub fn new(key_release_events: bool) -> EyreResult<(Self, cpal::Stream)> {
        let (backend, stream, audio_rx) = LiveBackend::start_with_tap(VIS_BUFFER_SIZE * 4)?;
        let analyzer = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, backend.sample_rate());

        Ok((
            Self {
                synth: Synth::new(),
                backend,
                audio_rx,
                audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
                analyzer,
                panel: ParamPanel::new(),
                keyboard_area: Rect::default(),
                held_keys: HashMap::new(),
                key_release_events,
                mouse_key: None,
                should_quit: false,
            },
            stream,
        ))
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.backend.run_pending();
            self.poll_audio();
            self.release_stale_holds();

            terminal.draw(|frame| self.render(frame))?;

            // Drain everything that arrived during the frame (~60fps).
            if event::poll(Duration::from_millis(16))? {
                loop {
                    match event::read()? {
                        Event::Key(key) => self.handle_key(key),
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                    if !event::poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }

        self.synth.all_notes_off(&mut self.backend);
        // Let the release tails schedule their teardown before we go.
        self.backend.run_pending();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press => self.handle_key_press(key),
            KeyEventKind::Repeat => {
                // Key repeat keeps the hold timer fresh; the registry
                // already suppresses retriggering.
                if let KeyCode::Char(c) = key.code {
                    let c = c.to_ascii_lowercase();
                    if self.held_keys.contains_key(&c) {
                        self.held_keys.insert(c, Instant::now());
                    }
                }
            }
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    let c = c.to_ascii_lowercase();
                    self.held_keys.remove(&c);
                    self.synth.note_off(c, &mut self.backend);
                }
            }
        }
    }

    fn handle_key_press(&mut self, key: KeyEvent) {
        let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.panel.select_prev(),
            KeyCode::Down => self.panel.select_next(),
            KeyCode::Left => self.panel.adjust(&mut self.synth, -1.0, coarse),
            KeyCode::Right => self.panel.adjust(&mut self.synth, 1.0, coarse),
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if let Some(note) = note_for_key(c) {
                    self.press(c, note);
                    if !self.key_release_events {
                        self.held_keys.insert(c, Instant::now());
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = key_at(self.keyboard_area, mouse.column, mouse.row) {
                    if let Some(note) = note_for_key(key) {
                        self.press(key, note);
                        self.mouse_key = Some(key);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                // Dragging off the pressed key releases it, like the
                // mouse leaving a held on-screen key. A redundant
                // note-off after button-up is a registry no-op.
                if let Some(held) = self.mouse_key {
                    if key_at(self.keyboard_area, mouse.column, mouse.row) != Some(held) {
                        self.synth.note_off(held, &mut self.backend);
                        self.mouse_key = None;
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(held) = self.mouse_key.take() {
                    self.synth.note_off(held, &mut self.backend);
                }
            }
            _ => {}
        }
    }

    fn press(&mut self, key: char, note: i32) {
        if let Err(err) = self.synth.note_on(key, note, &mut self.backend) {
            // Fail fast and drop the note; the next one may well fit.
            tracing::warn!(%key, note, %err, "note dropped");
        }
    }

    /// Auto-release held keys whose repeat events have stopped coming.
    fn release_stale_holds(&mut self) {
        if self.key_release_events {
            return;
        }
        let stale: Vec<char> = self
            .held_keys
            .iter()
            .filter(|(_, last)| last.elapsed() > HOLD_TIMEOUT)
            .map(|(&key, _)| key)
            .collect();
        for key in stale {
            self.held_keys.remove(&key);
            self.synth.note_off(key, &mut self.backend);
        }
    }

    /// Pull tap samples, keep the freshest window, refresh the FFT.
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }
        if received {
            let excess = self.audio_buffer.len().saturating_sub(VIS_BUFFER_SIZE);
            self.audio_buffer.drain(0..excess);
            self.analyzer.update(&self.audio_buffer);
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Length(11), // Parameter panel
                Constraint::Length(5),  // Keyboard
                Constraint::Min(8),     // Waveform
                Constraint::Length(9),  // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        self.keyboard_area = chunks[2];

        render_status(frame, chunks[0], &self.synth);
        render_params(frame, chunks[1], &self.synth, &self.panel);
        render_keyboard(frame, chunks[2], &self.synth);
        render_waveform(frame, chunks[3], &self.audio_buffer);
        render_spectrum(frame, chunks[4], self.analyzer.data());
        render_help(frame, chunks[5]);
    }
}
