use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    dsp::envelope::{EnvelopeGenerator, EnvelopeStage},
    error::SynthError,
    signal::Signal,
    Sample, Time,
};

/// Gate changes sent from the control thread to an envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateMessage {
    Activate,
    Deactivate,
    Impulse { hold: Option<Time> },
    Reset,
}

const GATE_QUEUE_SIZE: usize = 64;

/// Control-side handle for a [`SharedEnvelope`].
pub struct EnvelopeHandle {
    tx: Producer<GateMessage>,
}

impl EnvelopeHandle {
    pub fn activate(&mut self) -> Result<(), SynthError> {
        self.send(GateMessage::Activate)
    }

    pub fn deactivate(&mut self) -> Result<(), SynthError> {
        self.send(GateMessage::Deactivate)
    }

    pub fn impulse(&mut self, hold: Option<Time>) -> Result<(), SynthError> {
        self.send(GateMessage::Impulse { hold })
    }

    pub fn reset(&mut self) -> Result<(), SynthError> {
        self.send(GateMessage::Reset)
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_abandoned()
    }

    fn send(&mut self, msg: GateMessage) -> Result<(), SynthError> {
        if self.tx.is_abandoned() {
            return Err(SynthError::Disconnected);
        }
        self.tx.push(msg).map_err(|_| SynthError::QueueFull)
    }
}

/// Audio-side envelope whose gate is driven through an [`EnvelopeHandle`].
///
/// Pending gate messages are applied at the start of each `sample` call,
/// so the generator is only ever touched by the thread that samples it.
pub struct SharedEnvelope {
    generator: EnvelopeGenerator,
    rx: Consumer<GateMessage>,
}

impl SharedEnvelope {
    pub fn new(generator: EnvelopeGenerator) -> (Self, EnvelopeHandle) {
        let (tx, rx) = RingBuffer::<GateMessage>::new(GATE_QUEUE_SIZE);
        (Self { generator, rx }, EnvelopeHandle { tx })
    }

    pub fn is_active(&self) -> bool {
        self.generator.is_active()
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.generator.stage()
    }

    fn drain(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                GateMessage::Activate => self.generator.activate(),
                GateMessage::Deactivate => self.generator.deactivate(),
                GateMessage::Impulse { hold } => self.generator.impulse(hold),
                GateMessage::Reset => self.generator.reset(),
            }
        }
    }
}

impl Signal for SharedEnvelope {
    fn sample(&mut self, time: Time) -> Sample {
        self.drain();
        self.generator.sample(time)
    }
}

/// Envelope driven by a gate signal: at or above 0.5 is high.
///
/// Pairs with [`Trigger`](crate::signal::Trigger) for control-thread gates.
pub struct Gated<G> {
    generator: EnvelopeGenerator,
    gate: G,
}

/// Gate threshold for signal-driven envelopes.
pub const GATE_THRESHOLD: Sample = 0.5;

impl<G: Signal> Gated<G> {
    pub fn new(generator: EnvelopeGenerator, gate: G) -> Self {
        Self { generator, gate }
    }

    pub fn generator(&self) -> &EnvelopeGenerator {
        &self.generator
    }
}

impl<G: Signal> Signal for Gated<G> {
    fn sample(&mut self, time: Time) -> Sample {
        if self.gate.sample(time) >= GATE_THRESHOLD {
            self.generator.activate();
        } else {
            self.generator.deactivate();
        }
        self.generator.sample(time)
    }
}
