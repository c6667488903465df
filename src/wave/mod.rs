//! Phase to sample shapes.
//!
//! A [`Wave`] answers "what is the waveform's value at this point of its
//! cycle". It holds no state, so one wave can be shared by any number of
//! oscillators, each with its own phase.

/// Precomputed tables with nearest-index and interpolated lookup.
pub mod table;

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Phase, Sample};

pub use table::{LinearWavetable, Wavetable, WaveTables};

/// A function from phase (position within one cycle) to sample value.
pub trait Wave: Send + Sync {
    fn at(&self, phase: Phase) -> Sample;
}

impl<F> Wave for F
where
    F: Fn(Phase) -> Sample + Send + Sync,
{
    #[inline]
    fn at(&self, phase: Phase) -> Sample {
        self(phase)
    }
}

/// A wave shared read-only between oscillators and envelopes.
pub type SharedWave = Arc<dyn Wave>;

/// Wrap any wave for sharing.
pub fn shared(wave: impl Wave + 'static) -> SharedWave {
    Arc::new(wave)
}

/// Standard waveform selector.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveShape {
    #[default]
    Sine,
    Triangle,
    Square,
    Saw,
}

impl WaveShape {
    pub const ALL: [WaveShape; 4] = [
        WaveShape::Sine,
        WaveShape::Triangle,
        WaveShape::Square,
        WaveShape::Saw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WaveShape::Sine => "sine",
            WaveShape::Triangle => "triangle",
            WaveShape::Square => "square",
            WaveShape::Saw => "saw",
        }
    }

    /// Cycle to the next shape (wraps).
    pub fn next(self) -> Self {
        match self {
            WaveShape::Sine => WaveShape::Triangle,
            WaveShape::Triangle => WaveShape::Square,
            WaveShape::Square => WaveShape::Saw,
            WaveShape::Saw => WaveShape::Sine,
        }
    }
}

/*
Envelope Segment Shapes
=======================

These three are evaluated on a segment ratio that has already been clamped
to [0, 1]; they are NOT wrapped into a cycle.

  ramp_up(r)   = r        attack default:   0 → 1
  ramp_down(r) = 1 - r    decay/release:    1 → 0
  constant(r)  = 1        sustain default:  flat

An envelope scales and offsets them (see dsp::envelope), so a custom shape
only needs to describe the curve between 0 and 1.
*/

#[inline]
pub fn ramp_up(phase: Phase) -> Sample {
    phase
}

#[inline]
pub fn ramp_down(phase: Phase) -> Sample {
    1.0 - phase
}

#[inline]
pub fn constant(_phase: Phase) -> Sample {
    1.0
}

/// Exact sine, for when a table lookup is not wanted.
#[inline]
pub fn sine(phase: Phase) -> Sample {
    (phase * std::f32::consts::TAU).sin()
}

/// Rising sawtooth from -1 to 1 over one cycle.
#[inline]
pub fn saw(phase: Phase) -> Sample {
    2.0 * phase.rem_euclid(1.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_waves() {
        let half = |p: Phase| p * 0.5;
        assert_eq!(half.at(0.5), 0.25);

        let shared: SharedWave = shared(ramp_down);
        assert_eq!(shared.at(0.25), 0.75);
    }

    #[test]
    fn segment_shapes_span_unit_interval() {
        assert_eq!(ramp_up(0.0), 0.0);
        assert_eq!(ramp_up(1.0), 1.0);
        assert_eq!(ramp_down(0.0), 1.0);
        assert_eq!(ramp_down(1.0), 0.0);
        assert_eq!(constant(0.3), 1.0);
    }

    #[test]
    fn analytic_shapes() {
        assert!(sine(0.0).abs() < 1e-6);
        assert!((sine(0.25) - 1.0).abs() < 1e-6);
        assert_eq!(saw(0.0), -1.0);
        assert_eq!(saw(0.5), 0.0);
        assert_eq!(saw(1.25), -0.5);
    }

    #[test]
    fn shape_cycle_visits_all() {
        let mut shape = WaveShape::default();
        for expected in WaveShape::ALL {
            assert_eq!(shape, expected);
            shape = shape.next();
        }
        assert_eq!(shape, WaveShape::Sine);
    }
}
