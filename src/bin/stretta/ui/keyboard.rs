//! On-screen keyboard widget.
//!
//! Thirteen drawn keys, one per entry of the keymap table, playable with
//! the mouse. Cell geometry is recomputed from the area every frame; the
//! same function drives rendering and mouse hit-testing so they can never
//! disagree.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stretta::io::keymap::{is_accidental, PLAYABLE_KEYS};
use stretta::synth::Synth;

/// The drawn cell for each playable key, in note order.
fn key_cells(area: Rect) -> Vec<(char, i32, Rect)> {
    let count = PLAYABLE_KEYS.len() as u16;
    if area.width < count || area.height < 3 {
        return Vec::new();
    }
    let cell_width = (area.width / count).min(7);

    PLAYABLE_KEYS
        .iter()
        .enumerate()
        .map(|(i, &(key, note))| {
            let x = area.x + i as u16 * cell_width;
            (key, note, Rect::new(x, area.y, cell_width, area.height))
        })
        .collect()
}

/// The playable key under a terminal cell, if any.
pub fn key_at(area: Rect, column: u16, row: u16) -> Option<char> {
    key_cells(area)
        .into_iter()
        .find(|(_, _, rect)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(key, _, _)| key)
}

pub fn render_keyboard(frame: &mut Frame, area: Rect, synth: &Synth) {
    for (key, note, rect) in key_cells(area) {
        let live = synth.is_live(key);
        let style = match (live, is_accidental(note)) {
            (true, _) => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(Color::White).bg(Color::DarkGray),
            (false, false) => Style::default().fg(Color::Black).bg(Color::Gray),
        };

        let cell = Paragraph::new(format!("{key}\n{note}"))
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(cell, rect);
    }
}
