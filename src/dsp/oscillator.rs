use crate::{
    signal::{Param, Signal},
    wave::{SharedWave, WaveShape, WaveTables},
    Phase, Sample, Time,
};

/*
Phase-Accumulating Oscillator
=============================

An oscillator turns a stateless Wave (phase → sample) into a Signal
(time → sample) by remembering where in the cycle it is.

The accumulator
---------------
Each query advances the phase by how many cycles fit in the time that
passed since the previous query:

    dt        = max(t - last_time, 0)
    phase     = (phase + frequency(t) * dt) mod 1
    last_time = max(last_time, t)
    output    = wave(phase)

Because the increment is computed from the actual time delta, the same
oscillator works at any sample rate and tolerates irregular query spacing.

Why integrate instead of computing wave(f * t)?
-----------------------------------------------
With a constant frequency both give the same result. With a changing
frequency (a glide, vibrato, FM) `wave(f(t) * t)` jumps wildly because
every change of f rescales the whole elapsed time. Integrating only the
small step keeps the waveform continuous:

    f changes 440 → 880 at t = 1.0

    wave(f*t):    phase jumps from 440 cycles to 880 cycles (click)
    integrated:   phase keeps going, just twice as fast from here on

Time never runs backward
------------------------
Repeating a query time (or going back in time) gives dt = 0, so the phase
stays put. Negative frequencies are allowed and run the cycle backwards;
the Euclidean modulo keeps the phase inside [0, 1) either way.

Frequency modulation
--------------------
The frequency input is itself a Signal. With `Param::Fixed` it is a plain
number; with `Param::Modulated` any signal drives it:

    let vibrato = BoxedSignal::constant(440.0) + lfo * 5.0;
    let osc = Oscillator::new(tables.sine.clone(), vibrato);

Two oscillators sharing a wave never share phase: the wave is read-only,
the phase lives here.
*/

/// Wraps a [`Wave`](crate::Wave) with a frequency input and running phase.
pub struct Oscillator<F = Param> {
    wave: SharedWave,
    frequency: F,
    phase: Phase,
    last_time: Time,
}

impl<F: Signal> Oscillator<F> {
    pub fn new(wave: SharedWave, frequency: F) -> Self {
        Self {
            wave,
            frequency,
            phase: 0.0,
            last_time: 0.0,
        }
    }

    /// Start at `phase` instead of 0.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = wrap_phase(phase);
        self
    }

    /// Re-seed phase and the time origin (voice reuse).
    pub fn reset(&mut self, phase: Phase, time: Time) {
        self.phase = wrap_phase(phase);
        self.last_time = time;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_time(&self) -> Time {
        self.last_time
    }

    pub fn wave(&self) -> &SharedWave {
        &self.wave
    }

    pub fn set_wave(&mut self, wave: SharedWave) {
        self.wave = wave;
    }

    pub fn frequency_mut(&mut self) -> &mut F {
        &mut self.frequency
    }
}

impl Oscillator<Param> {
    /// Build an oscillator for one of the standard shapes.
    pub fn shape(tables: &WaveTables, shape: WaveShape, frequency: impl Into<Param>) -> Self {
        Self::new(tables.get(shape), frequency.into())
    }

    /// Swap the frequency input, handing back the previous one.
    pub fn set_frequency(&mut self, frequency: impl Into<Param>) -> Param {
        std::mem::replace(&mut self.frequency, frequency.into())
    }
}

impl<F: Signal> Signal for Oscillator<F> {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        let dt = (time - self.last_time).max(0.0);
        let frequency = self.frequency.sample(time);
        self.phase = wrap_phase(self.phase + frequency * dt);
        self.last_time = self.last_time.max(time);
        self.wave.at(self.phase)
    }
}

#[inline]
fn wrap_phase(phase: Phase) -> Phase {
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid rounds to exactly 1.0 for tiny negative inputs
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn sine(tables: &WaveTables, frequency: impl Into<Param>) -> Oscillator {
    Oscillator::shape(tables, WaveShape::Sine, frequency)
}

pub fn triangle(tables: &WaveTables, frequency: impl Into<Param>) -> Oscillator {
    Oscillator::shape(tables, WaveShape::Triangle, frequency)
}

pub fn square(tables: &WaveTables, frequency: impl Into<Param>) -> Oscillator {
    Oscillator::shape(tables, WaveShape::Square, frequency)
}

pub fn saw(tables: &WaveTables, frequency: impl Into<Param>) -> Oscillator {
    Oscillator::shape(tables, WaveShape::Saw, frequency)
}
