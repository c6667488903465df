//! Error types for construction-time and control-plane failures.
//!
//! The per-sample audio path is infallible: degenerate numeric input
//! (division by zero, empty tables) falls back to well-defined values
//! instead of producing errors. Everything in here is reported to the
//! caller that tried to build or schedule something invalid.

use thiserror::Error;

use crate::synth::NoteId;

/// Invalid envelope configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EnvelopeError {
    /// Attack time below zero.
    #[error("attack must be >= 0 seconds, got {0}")]
    NegativeAttack(f32),

    /// Decay time below zero.
    #[error("decay must be >= 0 seconds, got {0}")]
    NegativeDecay(f32),

    /// Sustain level below zero.
    #[error("sustain must be >= 0, got {0}")]
    NegativeSustain(f32),

    /// Release time below zero.
    #[error("release must be >= 0 seconds, got {0}")]
    NegativeRelease(f32),

    /// Decay and sustain must be configured together.
    #[error("decay and sustain must both be present (ADSR) or both absent (AR)")]
    DecaySustainMismatch,

    /// A parameter was NaN or infinite.
    #[error("envelope parameter '{0}' is not finite")]
    NonFinite(&'static str),
}

/// Invalid tuning configuration or ratio arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TuningError {
    /// Equal temperament needs at least one tone per octave.
    #[error("tone count must be > 0")]
    ZeroToneCount,

    /// Prime limit must be a positive integer.
    #[error("prime limit must be > 0")]
    ZeroPrimeLimit,

    /// Largest numerator/denominator must be a positive integer.
    #[error("maximum numerator/denominator must be > 0")]
    ZeroMax,

    /// Reference frequency must be finite and above zero.
    #[error("standard frequency must be a positive finite number of Hz, got {0}")]
    InvalidStandardFrequency(f64),

    /// A ratio was built with a zero denominator.
    #[error("ratio denominator must not be zero")]
    ZeroDenominator,
}

/// Control-plane failures when talking to a running synth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SynthError {
    /// The bounded control queue is full; the message was not sent.
    #[error("control queue is full")]
    QueueFull,

    /// The audio side has been dropped.
    #[error("audio side disconnected")]
    Disconnected,

    /// Note durations must be finite and non-negative.
    #[error("note duration must be a finite number of seconds >= 0")]
    InvalidDuration,

    /// A synth needs between 1 and 64 voice slots.
    #[error("voice count must be between 1 and 64, got {0}")]
    InvalidVoiceCount(usize),
}

/// Engine configuration and control failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("sample rate must be > 0 Hz")]
    InvalidSampleRate(u32),

    #[error("channel count must be > 0")]
    InvalidChannelCount(u16),

    /// Too many output replacements in flight.
    #[error("engine control queue is full")]
    QueueFull,

    /// The engine has been dropped.
    #[error("engine disconnected")]
    Disconnected,
}

/// [`Scheduler::dispatch_due`](crate::engine::Scheduler::dispatch_due)
/// stopped partway. `sent` holds the notes already handed to the synth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dispatch stopped after {} note(s): {source}", .sent.len())]
pub struct DispatchError {
    pub sent: Vec<NoteId>,
    #[source]
    pub source: SynthError,
}

/// Umbrella error for the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Envelope configuration error.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Tuning configuration error.
    #[error(transparent)]
    Tuning(#[from] TuningError),

    /// Synth control error.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// Engine configuration or control error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Scheduled dispatch error.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Convenience result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
