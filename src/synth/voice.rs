use crate::{
    dsp::{envelope::Envelope, EnvelopeGenerator, Oscillator},
    signal::{Param, Signal},
    synth::message::{NoteEvent, NoteId, NoteLifetime},
    wave::SharedWave,
    Sample, Time,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Gate open: attack/decay/sustain
    Releasing, // Gate closed, envelope in release
}

/// One oscillator times one envelope: a monophonic synth.
///
/// `play` retunes the oscillator and schedules the envelope impulse. The
/// release happens at sample time once the hold has elapsed, and the voice
/// frees itself when the release completes.
pub struct Voice {
    oscillator: Oscillator,
    envelope: EnvelopeGenerator,
    state: VoiceState,
    note: Option<NoteId>,
    lifetime: Option<NoteLifetime>,
    age: u64,
}

impl Voice {
    pub fn new(wave: SharedWave, envelope: Envelope) -> Self {
        Self {
            oscillator: Oscillator::new(wave, Param::Fixed(0.0)),
            envelope: EnvelopeGenerator::new(envelope),
            state: VoiceState::Free,
            note: None,
            lifetime: None,
            age: 0,
        }
    }

    /// Start `event` at `now`, replacing anything already playing.
    ///
    /// Returns the note's scheduled lifetime and the previous frequency
    /// input, so the caller decides where it gets dropped.
    pub fn play(&mut self, event: NoteEvent, now: Time) -> (NoteLifetime, Param) {
        self.play_as(NoteId(0), event, now, 0)
    }

    pub(crate) fn play_as(
        &mut self,
        id: NoteId,
        event: NoteEvent,
        now: Time,
        age: u64,
    ) -> (NoteLifetime, Param) {
        let previous = self.oscillator.set_frequency(event.frequency);
        self.oscillator.reset(0.0, now);
        self.envelope.reset();
        self.envelope.impulse(Some(event.duration));

        let lifetime = NoteLifetime::new(now, event.duration, self.envelope.envelope().release());
        self.state = VoiceState::Active;
        self.note = Some(id);
        self.lifetime = Some(lifetime);
        self.age = age;
        (lifetime, previous)
    }

    /// Silence immediately and free the slot. Returns the note that was
    /// playing, if any.
    pub fn cancel(&mut self) -> Option<NoteId> {
        let note = if self.is_free() { None } else { self.note };
        self.envelope.reset();
        self.free();
        note
    }

    /// Swap the frequency input back to a fixed 0 and hand out the old one.
    pub fn take_frequency(&mut self) -> Param {
        self.oscillator.set_frequency(0.0)
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
        self.lifetime = None;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn lifetime(&self) -> Option<NoteLifetime> {
        self.lifetime
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn envelope(&self) -> &EnvelopeGenerator {
        &self.envelope
    }
}

impl Signal for Voice {
    fn sample(&mut self, time: Time) -> Sample {
        if self.is_free() {
            return 0.0;
        }

        let out = self.oscillator.sample(time) * self.envelope.sample(time);

        if self.state == VoiceState::Active && self.envelope.released_time().is_some() {
            self.state = VoiceState::Releasing;
        }
        if !self.envelope.is_active() {
            self.free();
        }
        out
    }
}
