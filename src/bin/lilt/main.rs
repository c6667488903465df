//! lilt - play a polyphonic synth from the terminal
//!
//! Run with: cargo run --bin lilt
//! Logs go to stderr, filtered by RUST_LOG (default: warn).

mod app;
mod audio;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let audio = audio::start()?;
    let mut app = app::App::new(audio);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
