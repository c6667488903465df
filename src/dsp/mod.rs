//! Stateful signal primitives used by voices.
//!
//! Everything here is allocation-free once constructed and safe to sample
//! from the audio thread. Each primitive owns its own state (phase, stage
//! timestamps); nothing is shared except read-only waves.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Gate plumbing: control-thread handles and signal-driven gates.
pub mod gate;
/// Decibel conversions.
pub mod level;
/// Phase-accumulating oscillator over any wave.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeBuilder, EnvelopeGenerator, EnvelopeStage, EnvelopeTimes};
pub use gate::{EnvelopeHandle, Gated, SharedEnvelope};
pub use oscillator::Oscillator;
