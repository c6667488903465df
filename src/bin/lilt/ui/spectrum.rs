//! Spectrum analyzer
//!
//! Hann-windowed FFT of the scope buffer, read out at log-spaced
//! frequencies so each octave gets the same width on screen.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use lilt_dsp::{dsp::level::amplitude_to_db, signal::TapReading};

const BANDS: usize = 64;
const LOWEST_HZ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin read for each band
    bins: Vec<usize>,
    /// (log2 of band frequency, level in dB)
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(len: usize, sample_rate: f32) -> Self {
        let len = len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(len);

        let denom = (len - 1) as f32;
        let window = (0..len)
            .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / denom).cos())
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).max(LOWEST_HZ * 2.0);
        let span = (nyquist / LOWEST_HZ).log2();
        let last_bin = len / 2 - 1;
        let (bins, points) = (0..BANDS)
            .map(|band| {
                let octaves = span * band as f64 / (BANDS - 1) as f64;
                let hz = LOWEST_HZ * octaves.exp2();
                let bin = ((hz * len as f64 / sample_rate as f64).round() as usize).min(last_bin);
                (bin, (hz.log2(), FLOOR_DB))
            })
            .unzip();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); len],
            bins,
            points,
        }
    }

    pub fn update(&mut self, readings: &[TapReading]) {
        if readings.len() != self.window.len() {
            return;
        }
        for ((slot, r), &w) in self.scratch.iter_mut().zip(readings).zip(&self.window) {
            *slot = Complex::new(r.sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // a full-scale sine under a Hann window peaks at len / 4
        let norm = self.scratch.len() as f32 / 4.0;
        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let db = amplitude_to_db(self.scratch[bin].norm() / norm) as f64;
            point.1 = db.max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, points: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let lowest = LOWEST_HZ.log2();
    let highest = points.last().map_or(lowest + 1.0, |p| p.0.max(lowest + 1.0));

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lowest, highest])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
