//! Triggered oscilloscope
//!
//! The trace starts at the first rising zero crossing in the older half of
//! the capture, so a steady tone holds still on screen. The x axis is the
//! engine time carried by each reading.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use lilt_dsp::{dsp::level::db_to_amplitude, signal::TapReading};

/// First reading after a rising zero crossing, searched in `0..limit`.
fn trigger_index(scope: &[TapReading], limit: usize) -> usize {
    scope
        .windows(2)
        .take(limit)
        .position(|pair| pair[0].sample < 0.0 && pair[1].sample >= 0.0)
        .map_or(0, |i| i + 1)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, scope: &[TapReading], peak_db: f32) {
    let view = scope.len() / 2;
    let start = trigger_index(scope, view);
    let shown = &scope[start..(start + view).min(scope.len())];

    let origin = shown.first().map_or(0.0, |r| r.time);
    let trace: Vec<(f64, f64)> = shown
        .iter()
        .map(|r| ((r.time - origin) as f64 * 1000.0, r.sample as f64))
        .collect();
    let span_ms = trace.last().map_or(0.0, |p| p.0).max(1e-3);

    let peak = db_to_amplitude(peak_db).min(1.0) as f64;
    let upper = [(0.0, peak), (span_ms, peak)];
    let lower = [(0.0, -peak), (span_ms, -peak)];
    let guide = Style::default().fg(Color::DarkGray);

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&trace)];
    if peak > 1e-4 {
        for bound in [&upper[..], &lower[..]] {
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(guide)
                    .data(bound),
            );
        }
    }

    let block = Block::default()
        .title(format!(" Output  peak {peak:.2} "))
        .borders(Borders::ALL);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, span_ms])
                .labels(vec![Span::raw("0"), Span::raw(format!("{span_ms:.1} ms"))])
                .style(guide),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec!["-1", "0", "1"])
                .style(guide),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(samples: &[f32]) -> Vec<TapReading> {
        samples
            .iter()
            .enumerate()
            .map(|(i, &sample)| TapReading {
                time: i as f32 * 0.001,
                sample,
            })
            .collect()
    }

    #[test]
    fn trigger_lands_after_rising_crossing() {
        let scope = readings(&[0.5, 0.2, -0.3, -0.1, 0.0, 0.4, -0.2, 0.3]);
        assert_eq!(trigger_index(&scope, 4), 4);
    }

    #[test]
    fn no_crossing_starts_at_zero() {
        let scope = readings(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(trigger_index(&scope, 2), 0);
        assert_eq!(trigger_index(&[], 0), 0);
    }
}
