//! TUI layout for lilt

pub mod spectrum;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::app::App;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Status
            Constraint::Min(8),     // Oscilloscope
            Constraint::Length(10), // Spectrum
            Constraint::Length(1),  // Help bar
        ])
        .split(frame.area());

    status::render_status(frame, chunks[0], app);
    waveform::render_waveform(frame, chunks[1], &app.scope, app.stats.peak_db);
    spectrum::render_spectrum(frame, chunks[2], app.spectrum.data());

    let help = Paragraph::new(
        " [A-K] Play  [P] Arpeggio  [T] Tuning  [W] Wave  [↑/↓] Octave  [X] Stop  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
