//! Tuning systems: which frequency ratios make up a scale.
//!
//! Pitch here is measured in octaves relative to a standard frequency:
//! pitch `0.0` is the standard (440 Hz by default), `1.0` one octave up,
//! `-0.5` a tritone below in 12-TET. The fractional part of a pitch is its
//! pitch class, which gets snapped to the nearest interval in the table.

/// 12-TET interval classes and chord qualities.
pub mod interval;
/// Prime sieve, factorization and smooth numbers.
pub mod primes;
/// Exact rationals and prime-limited ratio sets.
pub mod ratio;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::error::TuningError;

pub use interval::{Chord, IntervalClass};
pub use ratio::{prime_limited_ratios, Ratio};

/// Frequency in Hz.
pub type Frequency = f64;
/// Octaves relative to the standard frequency.
pub type Pitch = f64;

pub const DEFAULT_STANDARD_FREQUENCY: Frequency = 440.0;
pub const DEFAULT_TONE_COUNT: usize = 12;
pub const DEFAULT_PRIME_LIMIT: u64 = 5;
pub const DEFAULT_MAX: u64 = 40;

/// MIDI note number of the standard pitch (A4).
pub const MIDI_STANDARD_NOTE: f64 = 69.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuningMode {
    /// `tone_count` equal steps per octave.
    #[default]
    EqualTemperament,
    /// Just intonation from ratios of small smooth integers.
    PrimeLimited,
}

/// Plain parameters of a tuning, without the derived interval table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningConfig {
    pub mode: TuningMode,
    pub tone_count: usize,
    pub prime_limit: u64,
    pub max: u64,
    pub standard_frequency: Frequency,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            mode: TuningMode::EqualTemperament,
            tone_count: DEFAULT_TONE_COUNT,
            prime_limit: DEFAULT_PRIME_LIMIT,
            max: DEFAULT_MAX,
            standard_frequency: DEFAULT_STANDARD_FREQUENCY,
        }
    }
}

/// A tuning system and its derived interval table.
///
/// Parameters for both modes are kept; changing any parameter of the
/// active mode, or switching modes, recomputes the table. The first entry
/// is always the unison `1.0` and the table is ascending.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "TuningConfig", into = "TuningConfig")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    config: TuningConfig,
    intervals: Vec<f64>,
    ratios: Vec<Ratio>,
}

impl Tuning {
    /// `tone_count` equal divisions of the octave.
    pub fn equal_temperament(
        tone_count: usize,
        standard_frequency: Frequency,
    ) -> Result<Self, TuningError> {
        Self::from_config(TuningConfig {
            mode: TuningMode::EqualTemperament,
            tone_count,
            standard_frequency,
            ..TuningConfig::default()
        })
    }

    /// Just intonation where every ratio's numerator and denominator are
    /// `prime_limit`-smooth and at most `max`.
    pub fn prime_limited(
        prime_limit: u64,
        max: u64,
        standard_frequency: Frequency,
    ) -> Result<Self, TuningError> {
        Self::from_config(TuningConfig {
            mode: TuningMode::PrimeLimited,
            prime_limit,
            max,
            standard_frequency,
            ..TuningConfig::default()
        })
    }

    pub fn from_config(config: TuningConfig) -> Result<Self, TuningError> {
        validate(&config)?;
        let mut tuning = Self {
            config,
            intervals: Vec::new(),
            ratios: Vec::new(),
        };
        tuning.recompute();
        Ok(tuning)
    }

    fn recompute(&mut self) {
        match self.config.mode {
            TuningMode::EqualTemperament => {
                let n = self.config.tone_count;
                self.ratios.clear();
                self.intervals = (0..n).map(|i| 2f64.powf(i as f64 / n as f64)).collect();
            }
            TuningMode::PrimeLimited => {
                let set = prime_limited_ratios(self.config.prime_limit, self.config.max);
                self.ratios = std::iter::once(Ratio::UNISON).chain(set).collect();
                self.intervals = self.ratios.iter().map(Ratio::to_f64).collect();
            }
        }
        debug!(
            mode = ?self.config.mode,
            intervals = self.intervals.len(),
            "tuning recomputed"
        );
    }

    fn update(&mut self, change: impl FnOnce(&mut TuningConfig)) -> Result<(), TuningError> {
        let mut next = self.config;
        change(&mut next);
        validate(&next)?;
        self.config = next;
        self.recompute();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TuningMode) -> Result<(), TuningError> {
        self.update(|c| c.mode = mode)
    }

    pub fn set_tone_count(&mut self, tone_count: usize) -> Result<(), TuningError> {
        self.update(|c| c.tone_count = tone_count)
    }

    pub fn set_prime_limit(&mut self, prime_limit: u64) -> Result<(), TuningError> {
        self.update(|c| c.prime_limit = prime_limit)
    }

    pub fn set_max(&mut self, max: u64) -> Result<(), TuningError> {
        self.update(|c| c.max = max)
    }

    pub fn set_standard_frequency(&mut self, frequency: Frequency) -> Result<(), TuningError> {
        self.update(|c| c.standard_frequency = frequency)
    }

    pub fn config(&self) -> TuningConfig {
        self.config
    }

    pub fn mode(&self) -> TuningMode {
        self.config.mode
    }

    pub fn standard_frequency(&self) -> Frequency {
        self.config.standard_frequency
    }

    /// Interval ratios of one octave, ascending, starting at 1.
    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }

    /// Exact ratios behind `intervals()`; empty in equal temperament.
    pub fn ratios(&self) -> &[Ratio] {
        &self.ratios
    }

    /// Split a pitch into octave and the table index nearest its class.
    fn nearest(&self, pitch: Pitch) -> (f64, usize) {
        let octave = pitch.floor();
        let class = pitch - octave;
        let index = self
            .intervals
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.log2() - class).abs();
                let db = (b.log2() - class).abs();
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        (octave, index)
    }

    /// Absolute frequency of the in-tune note nearest `pitch`.
    pub fn note_to_frequency(&self, pitch: Pitch) -> Frequency {
        let (octave, index) = self.nearest(pitch);
        let interval = self.intervals.get(index).copied().unwrap_or(1.0);
        self.config.standard_frequency * interval * 2f64.powf(octave)
    }

    /// `pitch` snapped to the nearest in-tune note.
    pub fn closest_note_in_tune(&self, pitch: Pitch) -> Pitch {
        let (octave, index) = self.nearest(pitch);
        let interval = self.intervals.get(index).copied().unwrap_or(1.0);
        octave + interval.log2()
    }

    /// Pitch of an arbitrary frequency, without snapping.
    pub fn frequency_to_pitch(&self, frequency: Frequency) -> Pitch {
        (frequency / self.config.standard_frequency).log2()
    }

    /// Pitch of the `index`-th step of the table, `octave` octaves up.
    pub fn degree_to_pitch(&self, index: usize, octave: i32) -> Pitch {
        let n = self.intervals.len().max(1);
        let wrapped_octave = octave as f64 + (index / n) as f64;
        let interval = self.intervals.get(index % n).copied().unwrap_or(1.0);
        wrapped_octave + interval.log2()
    }
}

impl Default for Tuning {
    /// 12-TET at 440 Hz.
    fn default() -> Self {
        let config = TuningConfig::default();
        let mut tuning = Self {
            config,
            intervals: Vec::new(),
            ratios: Vec::new(),
        };
        tuning.recompute();
        tuning
    }
}

impl TryFrom<TuningConfig> for Tuning {
    type Error = TuningError;

    fn try_from(config: TuningConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

impl From<Tuning> for TuningConfig {
    fn from(tuning: Tuning) -> Self {
        tuning.config
    }
}

/// MIDI note number to pitch in 12-TET octaves (A4 = 69 → 0.0).
pub fn midi_to_pitch(note: f64) -> Pitch {
    (note - MIDI_STANDARD_NOTE) / 12.0
}

fn validate(config: &TuningConfig) -> Result<(), TuningError> {
    if config.tone_count == 0 {
        return Err(TuningError::ZeroToneCount);
    }
    if config.prime_limit == 0 {
        return Err(TuningError::ZeroPrimeLimit);
    }
    if config.max == 0 {
        return Err(TuningError::ZeroMax);
    }
    let f = config.standard_frequency;
    if !f.is_finite() || f <= 0.0 {
        return Err(TuningError::InvalidStandardFrequency(f));
    }
    Ok(())
}
