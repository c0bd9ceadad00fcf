//! Spectrum widget
//!
//! FFT of the audio tap, displayed over the keyboard's useful range
//! (fundamentals C4..C5 plus the first few harmonics of the non-sine
//! waveforms). Log-spaced bins so each octave gets equal width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Displayed frequency range in Hz.
const MIN_FREQ: f64 = 100.0;
const MAX_FREQ: f64 = 4000.0;

/// Number of log-spaced display bins.
const BINS: usize = 40;

/// Magnitude floor in dB.
const DB_FLOOR: f64 = -90.0;

pub struct SpectrumAnalyzer {
    /// Hann window, same length as the tap buffer.
    window: Vec<f32>,
    /// FFT bin index backing each display bin.
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Display data: (frequency Hz, magnitude dB).
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                let t = i as f32 / (buffer_len.max(2) - 1) as f32;
                0.5 * (1.0 - (std::f32::consts::TAU * t).cos())
            })
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).max(MIN_FREQ + 1.0);
        let max_freq = MAX_FREQ.min(nyquist);
        let half = (buffer_len / 2).max(1);

        let mut bin_indices = Vec::with_capacity(BINS);
        let mut spectrum = Vec::with_capacity(BINS);
        for i in 0..BINS {
            let t = i as f64 / (BINS - 1) as f64;
            let freq = MIN_FREQ * (max_freq / MIN_FREQ).powf(t);
            let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq, DB_FLOOR));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    /// Recompute the spectrum from the latest tap samples.
    pub fn update(&mut self, samples: &[f32]) {
        if samples.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            slot.re = sample * w;
            slot.im = 0.0;
        }
        self.fft.process(&mut self.scratch);

        for (slot, &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im) as f64;
            slot.1 = (10.0 * power.max(1e-12).log10()).max(DB_FLOOR);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum chart.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.last().map(|(f, _)| *f).unwrap_or(MAX_FREQ);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([DB_FLOOR, 10.0])
                .labels(vec!["-90", "-40", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
