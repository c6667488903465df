//! Control loop: keyboard → notes, notifications → status, taps → scope

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::info;

use lilt_dsp::{
    dsp::level::{amplitude_to_db, SILENCE_DB},
    engine::Scheduler,
    signal::TapReading,
    synth::{NoteEvent, SynthNotification},
    tuning::{Chord, Tuning, TuningMode},
    Time,
};

use super::{audio::Audio, ui};

/// Samples kept for the oscilloscope and FFT
pub const SCOPE_LEN: usize = 2048;

const NOTE_KEYS: [char; 8] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k'];
const NOTE_LENGTH: Time = 0.35;
const ARPEGGIO_STEP: Time = 0.15;
/// Scheduling lead so the first arpeggio note is not already late
const LOOKAHEAD: Time = 0.05;

#[derive(Debug, Clone)]
pub struct Stats {
    pub started: u64,
    pub finished: u64,
    pub dropped: u64,
    pub cancelled: u64,
    pub peak_db: f32,
    pub rms_db: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            started: 0,
            finished: 0,
            dropped: 0,
            cancelled: 0,
            peak_db: SILENCE_DB,
            rms_db: SILENCE_DB,
        }
    }
}

pub struct App {
    pub audio: Audio,
    pub scheduler: Scheduler,
    pub tuning: Tuning,
    /// Octave offset from the standard frequency
    pub octave: i32,
    pub scope: Vec<TapReading>,
    pub spectrum: ui::spectrum::SpectrumAnalyzer,
    pub stats: Stats,
    should_quit: bool,
}

impl App {
    pub fn new(audio: Audio) -> Self {
        let sample_rate = audio.engine.sample_rate() as f32;
        Self {
            audio,
            scheduler: Scheduler::new(),
            tuning: Tuning::default(),
            octave: -1,
            scope: vec![TapReading { time: 0.0, sample: 0.0 }; SCOPE_LEN],
            spectrum: ui::spectrum::SpectrumAnalyzer::new(SCOPE_LEN, sample_rate),
            stats: Stats::default(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.tick()?;
            terminal.draw(|frame| ui::render(frame, self))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
        }
        self.audio.synth.stop().ok();
        Ok(())
    }

    fn tick(&mut self) -> EyreResult<()> {
        self.poll_taps();
        self.spectrum.update(&self.scope);

        for notification in self.audio.synth.poll() {
            match notification {
                SynthNotification::Started { .. } => self.stats.started += 1,
                SynthNotification::Finished { .. } => self.stats.finished += 1,
                SynthNotification::Dropped { .. } => self.stats.dropped += 1,
                SynthNotification::Cancelled { .. } => self.stats.cancelled += 1,
            }
        }

        let now = self.audio.engine.now();
        self.scheduler.dispatch_due(now, &mut self.audio.synth)?;
        self.audio.engine.collect_garbage();
        Ok(())
    }

    fn poll_taps(&mut self) {
        let mut fresh = 0;
        while let Ok(reading) = self.audio.taps.pop() {
            self.scope.push(reading);
            fresh += 1;
        }
        if self.scope.len() > SCOPE_LEN {
            let excess = self.scope.len() - SCOPE_LEN;
            self.scope.drain(..excess);
        }
        if fresh == 0 {
            return;
        }

        let window = &self.scope[SCOPE_LEN.saturating_sub(fresh)..];
        let peak = window.iter().fold(0.0f32, |m, r| m.max(r.sample.abs()));
        let rms = (window.iter().map(|r| r.sample * r.sample).sum::<f32>()
            / window.len() as f32)
            .sqrt();
        self.stats.peak_db = amplitude_to_db(peak);
        self.stats.rms_db = amplitude_to_db(rms);
    }

    fn handle_key(&mut self, key: KeyCode) -> EyreResult<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('t') => self.toggle_tuning()?,
            KeyCode::Char('p') => self.arpeggio(),
            KeyCode::Char('w') => {
                self.scheduler.clear();
                let next = self.audio.shape.next();
                self.audio.set_wave(next)?;
            }
            KeyCode::Char('x') => {
                self.scheduler.clear();
                self.audio.synth.stop()?;
            }
            KeyCode::Up => self.octave = (self.octave + 1).min(2),
            KeyCode::Down => self.octave = (self.octave - 1).max(-3),
            KeyCode::Char(c) => {
                if let Some(index) = NOTE_KEYS.iter().position(|&k| k == c) {
                    let pitch = self.tuning.degree_to_pitch(index, self.octave);
                    let frequency = self.tuning.note_to_frequency(pitch) as f32;
                    // a full queue just loses this keypress
                    self.audio
                        .synth
                        .play(NoteEvent::new(frequency, NOTE_LENGTH))
                        .ok();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn toggle_tuning(&mut self) -> EyreResult<()> {
        let mode = match self.tuning.mode() {
            TuningMode::EqualTemperament => TuningMode::PrimeLimited,
            TuningMode::PrimeLimited => TuningMode::EqualTemperament,
        };
        self.tuning.set_mode(mode)?;
        info!(?mode, steps = self.tuning.intervals().len(), "tuning switched");
        Ok(())
    }

    /// Major triad plus octave, snapped to the current tuning.
    fn arpeggio(&mut self) {
        let root = self.octave as f64;
        let pitches = Chord::Major
            .pitches(root)
            .into_iter()
            .chain(std::iter::once(root + 1.0));

        let start = self.audio.engine.now() + LOOKAHEAD;
        for (step, pitch) in pitches.enumerate() {
            let frequency = self.tuning.note_to_frequency(pitch) as f32;
            self.scheduler.enqueue(
                start + step as Time * ARPEGGIO_STEP,
                NoteEvent::new(frequency, NOTE_LENGTH),
            );
        }
    }

    pub fn tuning_label(&self) -> String {
        match self.tuning.mode() {
            TuningMode::EqualTemperament => format!("{}-TET", self.tuning.config().tone_count),
            TuningMode::PrimeLimited => format!(
                "{}-limit JI ({} steps)",
                self.tuning.config().prime_limit,
                self.tuning.intervals().len()
            ),
        }
    }
}
