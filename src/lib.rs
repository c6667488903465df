//! Realtime signal-synthesis core.
//!
//! Audio is built from [`Signal`]s: functions of time that may carry private
//! state (an oscillator's phase, an envelope's stage). Signals compose with
//! ordinary arithmetic, get sampled once per output frame by an [`Engine`],
//! and are driven from a separate control thread through lock-free handles.

pub mod dsp; // Oscillators, envelopes, gates
pub mod engine; // Output pull contract and control-side scheduling
pub mod error;
pub mod io;
pub mod signal; // Composable time signals
pub mod synth; // Voice management and polyphony
pub mod tuning; // Equal temperament and just intonation
pub mod wave; // Phase -> sample shapes and wavetables

pub use engine::{Engine, EngineConfig, EngineHandle};
pub use error::{Error, Result};
pub use signal::{BoxedSignal, Param, Signal, SignalExt};
pub use wave::{SharedWave, Wave, WaveTables};

/// Elapsed seconds since an arbitrary synthesis epoch.
pub type Time = f32;
/// One instantaneous audio value, nominally in [-1, 1] but never clamped.
pub type Sample = f32;
/// A gain or envelope level.
pub type Amplitude = f32;
/// Position within one waveform cycle, in [0, 1).
pub type Phase = f32;
