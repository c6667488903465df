use std::sync::Arc;

use crate::{
    wave::{shared, SharedWave, Wave, WaveShape},
    Phase, Sample,
};

/*
Wavetable Lookup
================

A wavetable stores one cycle of a waveform as N samples. Two lookup
policies turn a phase into a sample:

Nearest-index (Wavetable)
-------------------------
    index = floor((phase mod 1) * N)

The phase wraps first, so phase 1.25 reads the same slot as 0.25. With
the table [1, -1] every phase in [0, 0.5) reads 1 and every phase in
[0.5, 1) reads -1: a square wave from two numbers.

Linear interpolation (LinearWavetable)
--------------------------------------
The N points are treated as N-1 straight segments. The last point closes
the cycle, so a smooth loop repeats its first point at the end:

    points   [0, 1, 0, -1, 0]         4 segments
    phase    0   .25  .5  .75  1

    index    = (phase * (N-1)) mod (N-1)
    left     = floor(index)
    right    = left + 1
    value    = p[left] + (p[right] - p[left]) * (index - left)

Phase 0.125 lands halfway along the first segment: 0.5.

Degenerate tables never fail: an empty table is silence, a single point
is that constant.

Storage is an Arc<[Sample]>, so cloning a table is a reference count bump
and tables can be handed to any number of oscillators.
*/

/// Entries in the standard sine table.
pub const SINE_TABLE_SIZE: usize = 44_100;

/// Nearest-index wavetable.
#[derive(Debug, Clone)]
pub struct Wavetable {
    samples: Arc<[Sample]>,
}

impl Wavetable {
    pub fn new(samples: impl Into<Arc<[Sample]>>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    /// Sample one cycle of `f` at `len` evenly spaced phases.
    pub fn from_fn(len: usize, f: impl Fn(Phase) -> Sample) -> Self {
        let samples: Vec<Sample> = (0..len).map(|i| f(i as Phase / len as Phase)).collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Wave for Wavetable {
    #[inline]
    fn at(&self, phase: Phase) -> Sample {
        let n = self.samples.len();
        if n == 0 {
            return 0.0;
        }
        let index = (phase.rem_euclid(1.0) * n as Phase) as usize;
        self.samples[index.min(n - 1)]
    }
}

/// Linearly interpolated wavetable over `N - 1` segments.
#[derive(Debug, Clone)]
pub struct LinearWavetable {
    points: Arc<[Sample]>,
}

impl LinearWavetable {
    pub fn new(points: impl Into<Arc<[Sample]>>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Wave for LinearWavetable {
    #[inline]
    fn at(&self, phase: Phase) -> Sample {
        match self.points.len() {
            0 => 0.0,
            1 => self.points[0],
            n => {
                let last = n - 1;
                let segments = last as Phase;
                let index = (phase * segments).rem_euclid(segments);
                // rem_euclid can round up to `segments` for tiny negative inputs
                let left = (index as usize).min(last);
                let right = (left + 1).min(last);
                let frac = index - left as Phase;
                let a = self.points[left];
                let b = self.points[right];
                a + (b - a) * frac
            }
        }
    }
}

/// The standard waves, built once and shared.
///
/// There is no global instance: build one at startup and pass it (or the
/// waves it hands out) to whatever needs it.
pub struct WaveTables {
    pub sine: SharedWave,
    pub triangle: SharedWave,
    pub square: SharedWave,
    pub saw: SharedWave,
}

impl WaveTables {
    pub fn new() -> Self {
        let sine = Wavetable::from_fn(SINE_TABLE_SIZE, super::sine);
        Self {
            sine: shared(sine),
            triangle: shared(LinearWavetable::new(vec![0.0f32, 1.0, 0.0, -1.0, 0.0])),
            square: shared(Wavetable::new(vec![1.0f32, -1.0])),
            saw: shared(LinearWavetable::new(vec![-1.0f32, 1.0])),
        }
    }

    /// A fresh set behind an `Arc`, ready to hand to several owners.
    pub fn standard() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn get(&self, shape: WaveShape) -> SharedWave {
        match shape {
            WaveShape::Sine => self.sine.clone(),
            WaveShape::Triangle => self.triangle.clone(),
            WaveShape::Square => self.square.clone(),
            WaveShape::Saw => self.saw.clone(),
        }
    }
}

impl Default for WaveTables {
    fn default() -> Self {
        Self::new()
    }
}
