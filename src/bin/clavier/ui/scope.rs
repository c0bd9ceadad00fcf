//! Oscilloscope widget - recent engine output against a time axis

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Smallest vertical half-range, so a single held key (peaking at the 0.3
/// envelope target) fills a useful share of the chart.
const MIN_BOUND: f64 = 0.5;

/// Largest vertical half-range; chords beyond this clip visually.
const MAX_BOUND: f64 = 1.5;

/// Render the oscilloscope trace over the tap window.
///
/// The horizontal axis is real time in milliseconds; the vertical range
/// grows with the signal so chords stay on-chart without squashing a solo
/// note.
pub fn render_scope(frame: &mut Frame, area: Rect, samples: &[f32], sample_rate: f32) {
    let ms_per_sample = 1000.0 / sample_rate as f64;
    let window_ms = samples.len() as f64 * ms_per_sample;

    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 * ms_per_sample, s as f64))
        .collect();

    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let bound = (f64::from(peak) * 1.25).clamp(MIN_BOUND, MAX_BOUND);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(Block::default().title(" Scope ").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, window_ms.max(1.0)])
                .labels(vec!["0".to_string(), format!("{window_ms:.0}ms")])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-bound, bound])
                .labels(vec![
                    format!("{:+.2}", -bound),
                    "0".to_string(),
                    format!("{bound:+.2}"),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
