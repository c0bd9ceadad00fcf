//! Status bar widget - waveform selector, voice count, and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use clavier::dsp::Waveform;

use super::state::{UiStateInit, UiStateUpdate};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self {
                peak: 0.0,
                rms: 0.0,
            };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the status bar.
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    init: &UiStateInit,
    state: &UiStateUpdate,
    stats: &AudioStats,
) {
    let block = Block::default().title(" clavier ").borders(Borders::ALL);

    let mut spans = Vec::new();

    // Waveform selector: the active shape is highlighted.
    for (i, waveform) in Waveform::ALL.iter().enumerate() {
        let style = if *waveform == state.waveform {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {}:{} ", i + 1, waveform), style));
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("voices: {}  ", state.sounding),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::styled(
        format!("{:.1}kHz  ", init.sample_rate / 1000.0),
        Style::default().fg(Color::DarkGray),
    ));
    if !init.release_events {
        spans.push(Span::styled(
            format!("tap mode ({}ms)  ", init.tap_hold.as_millis()),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::styled(
        format!("peak: {:.2}  rms: {:.2}", stats.peak, stats.rms),
        Style::default().fg(Color::Magenta),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
