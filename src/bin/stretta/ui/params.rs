//! Parameter panel: the TUI stand-in for the original slider bank.
//!
//! Up/Down selects a parameter, Left/Right nudges it (Shift for coarse
//! steps). Values go through the synth's validated setters, so an
//! out-of-range nudge is rejected and the display simply doesn't move.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use stretta::envelope::EnvelopeParam;
use stretta::synth::Synth;
use stretta::tuning::TuningParam;

#[derive(Debug, Clone, Copy)]
enum ParamId {
    Tuning(TuningParam),
    Envelope(EnvelopeParam),
}

struct ParamSpec {
    id: ParamId,
    label: &'static str,
    unit: &'static str,
    decimals: usize,
    fine: f32,
    coarse: f32,
}

const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        id: ParamId::Tuning(TuningParam::BaseFrequency),
        label: "base frequency",
        unit: "Hz",
        decimals: 1,
        fine: 1.0,
        coarse: 10.0,
    },
    ParamSpec {
        id: ParamId::Tuning(TuningParam::IntervalRatio),
        label: "interval ratio",
        unit: "",
        decimals: 3,
        fine: 0.01,
        coarse: 0.1,
    },
    ParamSpec {
        id: ParamId::Tuning(TuningParam::Divisions),
        label: "divisions",
        unit: "steps",
        decimals: 0,
        fine: 1.0,
        coarse: 6.0,
    },
    ParamSpec {
        id: ParamId::Tuning(TuningParam::Inharmonicity),
        label: "inharmonicity",
        unit: "",
        decimals: 5,
        fine: 0.0001,
        coarse: 0.001,
    },
    ParamSpec {
        id: ParamId::Tuning(TuningParam::Brightness),
        label: "brightness",
        unit: "",
        decimals: 2,
        fine: 0.05,
        coarse: 0.25,
    },
    ParamSpec {
        id: ParamId::Envelope(EnvelopeParam::Attack),
        label: "attack",
        unit: "s",
        decimals: 3,
        fine: 0.005,
        coarse: 0.05,
    },
    ParamSpec {
        id: ParamId::Envelope(EnvelopeParam::Decay),
        label: "decay",
        unit: "s",
        decimals: 3,
        fine: 0.01,
        coarse: 0.1,
    },
    ParamSpec {
        id: ParamId::Envelope(EnvelopeParam::Sustain),
        label: "sustain",
        unit: "",
        decimals: 2,
        fine: 0.05,
        coarse: 0.2,
    },
    ParamSpec {
        id: ParamId::Envelope(EnvelopeParam::Release),
        label: "release",
        unit: "s",
        decimals: 2,
        fine: 0.05,
        coarse: 0.5,
    },
];

/// Selection state for the parameter panel.
pub struct ParamPanel {
    selected: usize,
}

impl ParamPanel {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.checked_sub(1).unwrap_or(PARAMS.len() - 1);
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % PARAMS.len();
    }

    /// Nudge the selected parameter. `direction` is -1.0 or 1.0.
    pub fn adjust(&self, synth: &mut Synth, direction: f32, coarse: bool) {
        let spec = &PARAMS[self.selected];
        let step = if coarse { spec.coarse } else { spec.fine };
        let value = current_value(synth, spec.id) + direction * step;

        // Rejections are logged by the setters; the panel just stays put.
        let _ = match spec.id {
            ParamId::Tuning(param) => synth.set_tuning(param, value),
            ParamId::Envelope(param) => synth.set_envelope(param, value),
        };
    }
}

fn current_value(synth: &Synth, id: ParamId) -> f32 {
    match id {
        ParamId::Tuning(TuningParam::BaseFrequency) => synth.tuning().base_frequency,
        ParamId::Tuning(TuningParam::IntervalRatio) => synth.tuning().interval_ratio,
        ParamId::Tuning(TuningParam::Divisions) => synth.tuning().divisions as f32,
        ParamId::Tuning(TuningParam::Inharmonicity) => synth.tuning().inharmonicity,
        ParamId::Tuning(TuningParam::Brightness) => synth.tuning().brightness,
        ParamId::Envelope(EnvelopeParam::Attack) => synth.timing().attack,
        ParamId::Envelope(EnvelopeParam::Decay) => synth.timing().decay,
        ParamId::Envelope(EnvelopeParam::Sustain) => synth.timing().sustain,
        ParamId::Envelope(EnvelopeParam::Release) => synth.timing().release,
    }
}

pub fn render_params(frame: &mut Frame, area: Rect, synth: &Synth, panel: &ParamPanel) {
    let lines: Vec<Line> = PARAMS
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let marker = if i == panel.selected { "▸" } else { " " };
            let value = current_value(synth, spec.id);
            let text = format!(
                " {marker} {:<15} {:>10.prec$} {}",
                spec.label,
                value,
                spec.unit,
                prec = spec.decimals
            );
            if i == panel.selected {
                Line::styled(
                    text,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Line::raw(text)
            }
        })
        .collect();

    let block = Block::default().title(" Parameters ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
