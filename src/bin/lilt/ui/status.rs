//! Status bar: device, tuning, voices, levels

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use lilt_dsp::dsp::level::SILENCE_DB;

use crate::app::App;

fn level(db: f32) -> String {
    if db <= SILENCE_DB {
        "-inf dB".to_string()
    } else {
        format!("{db:5.1} dB")
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let live = app.audio.synth.live_voices();
    let slots: String = live.indices().map(|i| format!("{i} ")).collect();
    let stats = &app.stats;

    let top = Line::from(vec![
        Span::styled(" rate ", label),
        Span::styled(format!("{} Hz", app.audio.engine.sample_rate()), value),
        Span::styled("  time ", label),
        Span::styled(format!("{:7.2}s", app.audio.engine.now()), value),
        Span::styled("  tuning ", label),
        Span::styled(app.tuning_label(), Style::default().fg(Color::Yellow)),
        Span::styled("  wave ", label),
        Span::styled(app.audio.shape.name(), value),
        Span::styled("  octave ", label),
        Span::styled(format!("{:+}", app.octave), value),
    ]);
    let bottom = Line::from(vec![
        Span::styled(" voices ", label),
        Span::styled(format!("{:2}", live.count()), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" [{}]", slots.trim_end()), label),
        Span::styled("  peak ", label),
        Span::styled(level(stats.peak_db), value),
        Span::styled("  rms ", label),
        Span::styled(level(stats.rms_db), value),
        Span::styled(
            format!(
                "  notes {} / {} done, {} dropped, {} cancelled",
                stats.started, stats.finished, stats.dropped, stats.cancelled
            ),
            label,
        ),
    ]);

    let block = Block::default().title(" lilt ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(vec![top, bottom]).block(block), area);
}
