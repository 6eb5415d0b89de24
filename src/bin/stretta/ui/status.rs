//! Status and help bars.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stretta::synth::Synth;

pub fn render_status(frame: &mut Frame, area: Rect, synth: &Synth) {
    let tuning = synth.tuning();
    let voices = synth.active_voices();

    let playing = if voices == 0 {
        Span::styled("ready", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            format!("{voices} voice(s)"),
            Style::default().fg(Color::Cyan),
        )
    };

    let line = Line::from(vec![
        Span::raw(format!(
            " {:.1} Hz · ratio {:.3} · {}-EDO · inharm {:.5} · bright {:.2}   ",
            tuning.base_frequency,
            tuning.interval_ratio,
            tuning.divisions,
            tuning.inharmonicity,
            tuning.brightness,
        )),
        playing,
    ]);

    let block = Block::default().title(" stretta ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        " [z..,] play  [mouse] play drawn keys  [↑↓] select param  [←→] adjust (shift: coarse)  [q] quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
