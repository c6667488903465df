#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::EnvelopeError,
    signal::Signal,
    wave::{self, shared, SharedWave},
    Amplitude, Sample, Time,
};

/*
Envelope Generator
==================

An envelope shapes a note's amplitude over its lifetime. It is a Signal
like any other, so a voice is simply `oscillator * envelope`.

Vocabulary
----------

  gate        Note on/off. Gate high starts the envelope, gate low starts
              the release from wherever the envelope is.

  stage       Idle, Attack, Decay, Sustain, Hold (AR plateau), Release.

  elapsed     Seconds since the envelope was triggered (t - triggered_at).

  ratio       Progress through the current segment, clamped to [0, 1].
              A zero-length segment has ratio 1: it is already over.

  shape       A Wave evaluated on the ratio. Defaults: ramp_up for attack,
              ramp_down for decay and release, constant for sustain.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release

  attack    attack_shape(elapsed / attack)
  decay     decay_shape((elapsed - attack) / decay) * (1 - S) + S
  sustain   sustain_shape(fract(elapsed - attack - decay)) * S
  release   release_shape((t - released_at) / release) * level_at_release

AR envelopes (no decay/sustain) hold at attack_shape(1) after the attack
until the gate falls.

The sustain shape is evaluated on the fractional part of the time spent
in sustain, so a non-constant shape repeats once per second (a slow
tremolo, for instance).


Time, not samples
-----------------
Unlike a per-sample increment envelope this one is a pure function of
the query time plus a few remembered instants (triggered_at, released_at,
last value). It works at any sample rate and the same query time always
gives the same answer.


The State Machine
-----------------

    ┌──────┐  gate ↑   ┌────────┐  elapsed ≥ A  ┌───────┐  ≥ A+D  ┌─────────┐
    │ Idle │ ────────→ │ Attack │ ────────────→ │ Decay │ ──────→ │ Sustain │
    └──────┘           └────────┘    (AR: Hold) └───────┘         └─────────┘
        ↑                   │                      │                  │
        │                   └──────────┬───────────┴──────────────────┘
        │                              │ gate ↓
        │    t ≥ released_at + R  ┌─────────┐
        └──────────────────────── │ Release │
                                  └─────────┘

  - The sample at the trigger instant is 0.
  - Release always starts from the level the envelope had at that
    instant (no click when releasing mid-attack).
  - Reaching Idle clears triggered_at, released_at and the last value, so
    the next trigger produces an identical fresh shape.
  - Gate high while already high does nothing. Gate high during Release
    restarts from a fresh Attack.


Impulses
--------
`impulse(hold)` opens the gate and schedules it to close `hold` seconds
after the next sample (default attack + release). The deadline is checked
at sample time, so no control-side timer has to be exact.
*/

/// Which segment the generator produced its most recent sample from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    /// AR plateau after the attack while the gate stays high
    Hold,
    Release,
}

/// Plain segment times, for configuration files.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeTimes {
    pub attack: Time,
    pub decay: Option<Time>,
    pub sustain: Option<Amplitude>,
    pub release: Time,
}

impl EnvelopeTimes {
    pub fn build(self) -> Result<Envelope, EnvelopeError> {
        Envelope::builder()
            .attack(self.attack)
            .decay_sustain_opt(self.decay, self.sustain)
            .release(self.release)
            .build()
    }
}

impl Default for EnvelopeTimes {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: Some(0.1),
            sustain: Some(0.7),
            release: 0.3,
        }
    }
}

/// Immutable envelope description: segment times, levels and shapes.
#[derive(Clone)]
pub struct Envelope {
    attack: Time,
    decay: Option<Time>,
    sustain: Option<Amplitude>,
    release: Time,
    attack_shape: SharedWave,
    decay_shape: SharedWave,
    sustain_shape: SharedWave,
    release_shape: SharedWave,
}

impl Envelope {
    /// Attack/release envelope with the default ramps.
    pub fn ar(attack: Time, release: Time) -> Result<Self, EnvelopeError> {
        Self::builder().attack(attack).release(release).build()
    }

    /// Attack/decay/sustain/release envelope with the default shapes.
    pub fn adsr(
        attack: Time,
        decay: Time,
        sustain: Amplitude,
        release: Time,
    ) -> Result<Self, EnvelopeError> {
        Self::builder()
            .attack(attack)
            .decay(decay)
            .sustain(sustain)
            .release(release)
            .build()
    }

    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::default()
    }

    pub fn attack(&self) -> Time {
        self.attack
    }

    pub fn decay(&self) -> Option<Time> {
        self.decay
    }

    pub fn sustain(&self) -> Option<Amplitude> {
        self.sustain
    }

    pub fn release(&self) -> Time {
        self.release
    }

    pub fn is_adsr(&self) -> bool {
        self.decay.is_some()
    }

    pub fn times(&self) -> EnvelopeTimes {
        EnvelopeTimes {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("attack", &self.attack)
            .field("decay", &self.decay)
            .field("sustain", &self.sustain)
            .field("release", &self.release)
            .finish_non_exhaustive()
    }
}

/// Builder for envelopes with custom segment shapes.
pub struct EnvelopeBuilder {
    attack: Time,
    decay: Option<Time>,
    sustain: Option<Amplitude>,
    release: Time,
    attack_shape: SharedWave,
    decay_shape: SharedWave,
    sustain_shape: SharedWave,
    release_shape: SharedWave,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self {
            attack: 0.0,
            decay: None,
            sustain: None,
            release: 0.0,
            attack_shape: shared(wave::ramp_up),
            decay_shape: shared(wave::ramp_down),
            sustain_shape: shared(wave::constant),
            release_shape: shared(wave::ramp_down),
        }
    }
}

impl EnvelopeBuilder {
    pub fn attack(mut self, seconds: Time) -> Self {
        self.attack = seconds;
        self
    }

    pub fn decay(mut self, seconds: Time) -> Self {
        self.decay = Some(seconds);
        self
    }

    pub fn sustain(mut self, level: Amplitude) -> Self {
        self.sustain = Some(level);
        self
    }

    fn decay_sustain_opt(mut self, decay: Option<Time>, sustain: Option<Amplitude>) -> Self {
        self.decay = decay;
        self.sustain = sustain;
        self
    }

    pub fn release(mut self, seconds: Time) -> Self {
        self.release = seconds;
        self
    }

    pub fn attack_shape(mut self, shape: SharedWave) -> Self {
        self.attack_shape = shape;
        self
    }

    pub fn decay_shape(mut self, shape: SharedWave) -> Self {
        self.decay_shape = shape;
        self
    }

    pub fn sustain_shape(mut self, shape: SharedWave) -> Self {
        self.sustain_shape = shape;
        self
    }

    pub fn release_shape(mut self, shape: SharedWave) -> Self {
        self.release_shape = shape;
        self
    }

    /// Validate and freeze.
    pub fn build(self) -> Result<Envelope, EnvelopeError> {
        check("attack", self.attack)?;
        check("release", self.release)?;
        if self.attack < 0.0 {
            return Err(EnvelopeError::NegativeAttack(self.attack));
        }
        if self.release < 0.0 {
            return Err(EnvelopeError::NegativeRelease(self.release));
        }

        match (self.decay, self.sustain) {
            (Some(decay), Some(sustain)) => {
                check("decay", decay)?;
                check("sustain", sustain)?;
                if decay < 0.0 {
                    return Err(EnvelopeError::NegativeDecay(decay));
                }
                if sustain < 0.0 {
                    return Err(EnvelopeError::NegativeSustain(sustain));
                }
            }
            (None, None) => {}
            _ => return Err(EnvelopeError::DecaySustainMismatch),
        }

        Ok(Envelope {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
            attack_shape: self.attack_shape,
            decay_shape: self.decay_shape,
            sustain_shape: self.sustain_shape,
            release_shape: self.release_shape,
        })
    }
}

fn check(name: &'static str, value: f32) -> Result<(), EnvelopeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EnvelopeError::NonFinite(name))
    }
}

/// Progress through a segment. Zero-length segments are already complete.
#[inline]
fn ratio(elapsed: Time, length: Time) -> f32 {
    if length <= 0.0 {
        1.0
    } else {
        (elapsed / length).clamp(0.0, 1.0)
    }
}

/// Stateful envelope signal for one voice.
pub struct EnvelopeGenerator {
    envelope: Envelope,
    gate: bool,
    triggered_time: Option<Time>,
    released_time: Option<Time>,
    last_value: Option<Amplitude>,
    pending_hold: Option<Time>,
    release_deadline: Option<Time>,
    stage: EnvelopeStage,
}

impl EnvelopeGenerator {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            gate: false,
            triggered_time: None,
            released_time: None,
            last_value: None,
            pending_hold: None,
            release_deadline: None,
            stage: EnvelopeStage::Idle,
        }
    }

    /// Gate high. Ignored while already high; restarts during release.
    pub fn activate(&mut self) {
        if self.gate {
            return;
        }
        self.gate = true;
        if self.released_time.is_some() {
            self.clear_transient();
        }
    }

    /// Gate low.
    pub fn deactivate(&mut self) {
        self.gate = false;
        self.pending_hold = None;
        self.release_deadline = None;
    }

    /// Open the gate and close it again `hold` seconds later.
    ///
    /// `None` holds for `attack + release`. The hold starts at the next
    /// sampled time.
    pub fn impulse(&mut self, hold: Option<Time>) {
        self.activate();
        let hold = hold.unwrap_or(self.envelope.attack + self.envelope.release);
        self.pending_hold = Some(hold.max(0.0));
        self.release_deadline = None;
    }

    /// Back to Idle immediately, gate low.
    pub fn reset(&mut self) {
        self.gate = false;
        self.pending_hold = None;
        self.release_deadline = None;
        self.clear_transient();
    }

    fn clear_transient(&mut self) {
        self.triggered_time = None;
        self.released_time = None;
        self.last_value = None;
        self.stage = EnvelopeStage::Idle;
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Triggered and not yet back to Idle.
    pub fn is_active(&self) -> bool {
        self.triggered_time.is_some()
    }

    pub fn is_gate_high(&self) -> bool {
        self.gate
    }

    pub fn triggered_time(&self) -> Option<Time> {
        self.triggered_time
    }

    /// Set once release has been initiated, cleared when it completes.
    pub fn released_time(&self) -> Option<Time> {
        self.released_time
    }

    pub fn last_value(&self) -> Option<Amplitude> {
        self.last_value
    }

    /// Level while the gate is held, `elapsed` seconds after the trigger.
    fn held_level(&mut self, elapsed: Time) -> Amplitude {
        let env = &self.envelope;
        let attack = env.attack;

        let (stage, level) = if elapsed < attack {
            (
                EnvelopeStage::Attack,
                env.attack_shape.at(ratio(elapsed, attack)),
            )
        } else {
            match (env.decay, env.sustain) {
                (Some(decay), Some(sustain)) => {
                    if elapsed < attack + decay {
                        let shape = env.decay_shape.at(ratio(elapsed - attack, decay));
                        (EnvelopeStage::Decay, shape * (1.0 - sustain) + sustain)
                    } else {
                        let cycle = (elapsed - attack - decay).rem_euclid(1.0);
                        (EnvelopeStage::Sustain, env.sustain_shape.at(cycle) * sustain)
                    }
                }
                _ => (EnvelopeStage::Hold, env.attack_shape.at(1.0)),
            }
        };

        self.stage = stage;
        self.last_value = Some(level);
        level
    }
}

impl Signal for EnvelopeGenerator {
    fn sample(&mut self, time: Time) -> Sample {
        if let Some(deadline) = self.release_deadline {
            if time >= deadline {
                self.release_deadline = None;
                self.gate = false;
            }
        }

        let Some(triggered) = self.triggered_time else {
            if !self.gate {
                return 0.0;
            }
            // rising edge: this instant is the start of the attack
            self.triggered_time = Some(time);
            self.last_value = Some(0.0);
            self.stage = EnvelopeStage::Attack;
            if let Some(hold) = self.pending_hold.take() {
                self.release_deadline = Some(time + hold);
            }
            return 0.0;
        };

        if let Some(hold) = self.pending_hold.take() {
            self.release_deadline = Some(time + hold);
        }

        if self.released_time.is_none() {
            let level = self.held_level((time - triggered).max(0.0));
            if self.gate {
                return level;
            }
            // falling edge: release starts from the level at this instant
            self.released_time = Some(time);
        }

        let released = self.released_time.unwrap_or(time);
        let release = self.envelope.release;
        if time >= released + release {
            self.clear_transient();
            return 0.0;
        }

        self.stage = EnvelopeStage::Release;
        let from = self
            .last_value
            .or(self.envelope.sustain)
            .unwrap_or(1.0);
        self.envelope.release_shape.at(ratio(time - released, release)) * from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Time = 0.001;

    fn ar() -> EnvelopeGenerator {
        EnvelopeGenerator::new(Envelope::ar(0.1, 0.5).expect("valid AR"))
    }

    #[test]
    fn validation_rejects_bad_configs() {
        assert_eq!(
            Envelope::ar(-0.1, 0.5).err(),
            Some(EnvelopeError::NegativeAttack(-0.1))
        );
        assert_eq!(
            Envelope::ar(0.1, -1.0).err(),
            Some(EnvelopeError::NegativeRelease(-1.0))
        );
        assert_eq!(
            Envelope::adsr(0.1, -0.2, 0.5, 0.1).err(),
            Some(EnvelopeError::NegativeDecay(-0.2))
        );
        assert_eq!(
            Envelope::adsr(0.1, 0.2, -0.5, 0.1).err(),
            Some(EnvelopeError::NegativeSustain(-0.5))
        );
        assert_eq!(
            Envelope::builder().attack(0.1).decay(0.2).release(0.1).build().err(),
            Some(EnvelopeError::DecaySustainMismatch)
        );
        assert_eq!(
            Envelope::ar(f32::NAN, 0.5).err(),
            Some(EnvelopeError::NonFinite("attack"))
        );
    }

    #[test]
    fn idle_until_gate_rises() {
        let mut env = ar();
        assert_eq!(env.sample(0.0), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn ar_envelope_full_cycle() {
        let mut env = ar();
        env.activate();

        assert_eq!(env.sample(0.0), 0.0);
        assert_eq!(env.triggered_time(), Some(0.0));

        let mut previous = 0.0;
        let mut t = DT;
        while t < 0.099 {
            let v = env.sample(t);
            assert!(v > 0.0 && v < 1.0, "attack value {v} at {t}");
            assert!(v > previous, "attack not increasing at {t}");
            previous = v;
            t += DT;
        }

        assert_eq!(env.sample(0.1), 1.0);
        assert_eq!(env.sample(0.15), 1.0);
        assert_eq!(env.stage(), EnvelopeStage::Hold);

        env.deactivate();
        assert_eq!(env.sample(0.2), 1.0);
        assert_eq!(env.released_time(), Some(0.2));

        let mut previous = 1.0;
        let mut t = 0.2 + 0.01;
        while t < 0.69 {
            let v = env.sample(t);
            assert!(v < previous, "release not decreasing at {t}");
            previous = v;
            t += 0.01;
        }

        assert_eq!(env.sample(0.7), 0.0);
        assert_eq!(env.triggered_time(), None);
        assert_eq!(env.released_time(), None);
        assert_eq!(env.sample(1.0), 0.0);
    }

    #[test]
    fn retrigger_after_idle_repeats_the_shape() {
        let mut env = ar();
        let mut first = Vec::new();
        env.activate();
        for i in 0..=5 {
            first.push(env.sample(i as Time * 0.02));
        }
        env.deactivate();
        env.sample(0.2);
        env.sample(0.8);
        assert!(!env.is_active());

        env.activate();
        let second: Vec<Sample> = (0..=5).map(|i| env.sample(2.0 + i as Time * 0.02)).collect();
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn adsr_decays_to_sustain() {
        let mut env = EnvelopeGenerator::new(Envelope::adsr(0.1, 0.2, 0.5, 0.3).expect("valid"));
        env.activate();
        env.sample(0.0);

        let mid_decay = env.sample(0.2);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
        assert!((mid_decay - 0.75).abs() < 1e-5);

        assert!((env.sample(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.sample(3.7) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn early_release_starts_from_current_level() {
        let mut env = EnvelopeGenerator::new(Envelope::adsr(1.0, 0.2, 0.5, 1.0).expect("valid"));
        env.activate();
        env.sample(0.0);
        assert!((env.sample(0.25) - 0.25).abs() < 1e-6);

        env.deactivate();
        // no jump at the release instant
        assert!((env.sample(0.3) - 0.3).abs() < 1e-6);
        assert!((env.sample(0.8) - 0.15).abs() < 1e-6);
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn zero_length_segments_are_instant() {
        let mut env = EnvelopeGenerator::new(Envelope::ar(0.0, 0.0).expect("valid"));
        env.activate();
        assert_eq!(env.sample(0.0), 0.0);
        assert_eq!(env.sample(0.001), 1.0);

        env.deactivate();
        let v = env.sample(0.002);
        assert!(v.is_finite());
        assert_eq!(v, 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn gate_high_while_high_is_ignored() {
        let mut env = ar();
        env.activate();
        env.sample(0.0);
        env.sample(0.05);

        env.activate();
        assert_eq!(env.triggered_time(), Some(0.0));
        assert!((env.sample(0.06) - 0.6).abs() < 1e-5);
    }

    #[test]
    fn gate_high_during_release_restarts_attack() {
        let mut env = ar();
        env.activate();
        env.sample(0.0);
        env.sample(0.2);
        env.deactivate();
        env.sample(0.3);
        assert_eq!(env.stage(), EnvelopeStage::Release);

        env.activate();
        assert_eq!(env.sample(0.4), 0.0);
        assert_eq!(env.triggered_time(), Some(0.4));
        assert_eq!(env.released_time(), None);
        assert!((env.sample(0.45) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn impulse_schedules_its_own_release() {
        let mut env = ar();
        env.impulse(Some(0.2));
        assert_eq!(env.sample(1.0), 0.0);
        assert_eq!(env.sample(1.15), 1.0);
        assert!(env.released_time().is_none());

        env.sample(1.2);
        assert_eq!(env.released_time(), Some(1.2));
        assert!(!env.is_gate_high());

        assert_eq!(env.sample(1.7), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn impulse_defaults_to_attack_plus_release() {
        let mut env = ar();
        env.impulse(None);
        env.sample(0.0);
        env.sample(0.59);
        assert!(env.released_time().is_none());
        env.sample(0.6);
        assert_eq!(env.released_time(), Some(0.6));
    }

    #[test]
    fn custom_shapes_are_used() {
        let env = Envelope::builder()
            .attack(1.0)
            .release(1.0)
            .attack_shape(shared(|r: f32| r * r))
            .build()
            .expect("valid");
        let mut generator = EnvelopeGenerator::new(env);
        generator.activate();
        generator.sample(0.0);
        assert!((generator.sample(0.5) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn times_round_trip_through_build() {
        let times = EnvelopeTimes::default();
        let env = times.build().expect("defaults are valid");
        assert_eq!(env.times(), times);
        assert!(env.is_adsr());
    }
}
