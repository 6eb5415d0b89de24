//! FFT spectrum widget.
//!
//! Shows where the stretched partials actually land, which makes the
//! inharmonicity and brightness parameters visible while playing. Bins
//! are log-spaced from 20 Hz to Nyquist.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of displayed frequency bins.
const SPECTRUM_BINS: usize = 48;

const MIN_DB: f64 = -90.0;

/// FFT processor mapping tap samples to log-spaced (Hz, dB) points.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin index and center frequency per displayed bin.
    bins: Vec<(usize, f64)>,
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `fft_size` must match the length of the buffers passed to
    /// [`update`](SpectrumAnalyzer::update).
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        // Hann window to reduce spectral leakage.
        let denom = (fft_size.max(2) - 1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        // Log-spaced centers from 20 Hz to Nyquist.
        let nyquist = (sample_rate as f64 / 2.0).max(40.0);
        let ratio = nyquist / 20.0;
        let half = (fft_size / 2).max(1);
        let bins: Vec<(usize, f64)> = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = 20.0 * ratio.powf(t);
                let index =
                    ((freq * fft_size as f64 / sample_rate as f64).round() as usize).min(half - 1);
                (index, freq)
            })
            .collect();

        let spectrum = bins.iter().map(|&(_, freq)| (freq, MIN_DB)).collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            bins,
            spectrum,
        }
    }

    /// Recompute the spectrum from a full tap buffer. Buffers of the wrong
    /// length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            slot.re = sample * w;
            slot.im = 0.0;
        }
        self.fft.process(&mut self.scratch);

        for (&(index, freq), point) in self.bins.iter().zip(&mut self.spectrum) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12) as f64;
            *point = (freq, (10.0 * power.log10()).max(MIN_DB));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum chart. The x axis is the bin position, which is
/// log-frequency by construction.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let data: Vec<(f64, f64)> = spectrum
        .iter()
        .enumerate()
        .map(|(i, &(_, db))| (i as f64, db))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Magenta))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Spectrum ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, (SPECTRUM_BINS - 1) as f64])
                .labels(vec!["20 Hz", "1 kHz", "20 kHz"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([MIN_DB, 10.0])
                .labels(vec!["-90", "-40", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
