//! Output pull contract.
//!
//! The device layer owns an [`Engine`] and asks it for one sample per frame.
//! The control side holds the matching [`EngineHandle`] and swaps the output
//! signal through a lock-free queue; whatever gets replaced is sent back so
//! the allocation is freed off the audio thread.

pub mod clock;
pub mod scheduler;

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::EngineError,
    io::AudioOutput,
    signal::{Constant, Signal},
    Sample, Time,
};

pub use clock::FrameClock;
pub use scheduler::Scheduler;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Output replacements in flight at once
    pub control_queue_capacity: usize,
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_control_queue_capacity(mut self, capacity: usize) -> Self {
        self.control_queue_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(EngineError::InvalidChannelCount(self.channels));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            control_queue_capacity: 16,
        }
    }
}

pub enum EngineMessage {
    SetOutput(Box<dyn Signal>),
}

/// Audio side. Lives inside the device callback.
pub struct Engine {
    output: Box<dyn Signal>,
    clock: FrameClock,
    channels: u16,
    rx: Consumer<EngineMessage>,
    garbage: Producer<Box<dyn Signal>>,
    now: Arc<AtomicU32>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<(Engine, EngineHandle), EngineError> {
        config.validate()?;
        let capacity = config.control_queue_capacity.max(1);
        let (tx, rx) = RingBuffer::new(capacity);
        // room for every replacement that can be in flight plus the initial output
        let (garbage_tx, garbage_rx) = RingBuffer::new(capacity + 1);
        let now = Arc::new(AtomicU32::new(0.0f32.to_bits()));

        let engine = Engine {
            output: Box::new(Constant(0.0)),
            clock: FrameClock::new(config.sample_rate),
            channels: config.channels,
            rx,
            garbage: garbage_tx,
            now: now.clone(),
        };
        let handle = EngineHandle {
            tx,
            garbage: garbage_rx,
            now,
            sample_rate: config.sample_rate,
            channels: config.channels,
        };
        Ok((engine, handle))
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    fn drain(&mut self) {
        while let Ok(EngineMessage::SetOutput(signal)) = self.rx.pop() {
            let old = std::mem::replace(&mut self.output, signal);
            // a full ring means the control side stopped collecting
            let _ = self.garbage.push(old);
        }
    }

    /// Pull one sample at the next frame time.
    pub fn next_sample(&mut self) -> Sample {
        let time = self.clock.tick();
        self.sample_at(time)
    }

    /// Pull one sample at an explicit time, without touching the clock.
    pub fn sample_at(&mut self, time: Time) -> Sample {
        self.drain();
        self.now.store(time.to_bits(), Ordering::Release);
        self.output.sample(time)
    }

    /// Fill an interleaved device buffer; every channel of a frame gets the
    /// same mono sample. A trailing partial frame is left untouched.
    pub fn render_interleaved(&mut self, out: &mut [f32]) {
        let channels = self.channels as usize;
        for frame in out.chunks_exact_mut(channels) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }

    /// Render `frames` into planar buffers, clamped to their length.
    pub fn process_block(&mut self, output: &mut AudioOutput, frames: usize) {
        let frames = frames.min(output.frames());
        for i in 0..frames {
            let sample = self.next_sample();
            for buffer in &mut output.buffers {
                buffer[i] = sample;
            }
        }
    }
}

/// Control side of an [`Engine`].
pub struct EngineHandle {
    tx: Producer<EngineMessage>,
    garbage: Consumer<Box<dyn Signal>>,
    now: Arc<AtomicU32>,
    sample_rate: u32,
    channels: u16,
}

impl EngineHandle {
    /// Replace the output signal; the engine switches at its next frame.
    pub fn set_output(&mut self, signal: impl Signal + 'static) -> Result<(), EngineError> {
        self.collect_garbage();
        if self.tx.is_abandoned() {
            return Err(EngineError::Disconnected);
        }
        self.tx
            .push(EngineMessage::SetOutput(Box::new(signal)))
            .map_err(|_| EngineError::QueueFull)?;
        debug!("output signal replaced");
        Ok(())
    }

    /// Drop replaced outputs. Returns how many were freed.
    pub fn collect_garbage(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(signal) = self.garbage.pop() {
            drop(signal);
            freed += 1;
        }
        freed
    }

    /// Time of the frame most recently rendered.
    pub fn now(&self) -> Time {
        Time::from_bits(self.now.load(Ordering::Acquire))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_abandoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::from_fn;

    fn engine(sample_rate: u32) -> (Engine, EngineHandle) {
        Engine::new(EngineConfig::default().with_sample_rate(sample_rate)).expect("valid config")
    }

    #[test]
    fn rejects_bad_configs() {
        assert_eq!(
            Engine::new(EngineConfig::default().with_sample_rate(0)).err(),
            Some(EngineError::InvalidSampleRate(0))
        );
        assert_eq!(
            Engine::new(EngineConfig::default().with_channels(0)).err(),
            Some(EngineError::InvalidChannelCount(0))
        );
    }

    #[test]
    fn silent_until_output_is_set() {
        let (mut engine, _handle) = engine(100);
        assert_eq!(engine.next_sample(), 0.0);
    }

    #[test]
    fn output_is_pulled_at_frame_times() {
        let (mut engine, mut handle) = engine(100);
        handle.set_output(from_fn(|t| t)).expect("queued");

        let pulled: Vec<Sample> = (0..4).map(|_| engine.next_sample()).collect();
        assert_eq!(pulled, vec![0.0, 0.01, 0.02, 0.03]);
        assert_eq!(handle.now(), 0.03);
    }

    #[test]
    fn replaced_outputs_return_to_the_control_side() {
        let (mut engine, mut handle) = engine(100);
        handle.set_output(Constant(1.0)).expect("queued");
        engine.next_sample();
        handle.set_output(Constant(2.0)).expect("queued");
        assert_eq!(engine.next_sample(), 2.0);

        // the initial silence and the first constant
        assert_eq!(handle.collect_garbage(), 2);
        assert_eq!(handle.collect_garbage(), 0);
    }

    #[test]
    fn interleaved_frames_repeat_the_sample() {
        let (mut engine, mut handle) = engine(100);
        handle.set_output(from_fn(|t| t * 100.0)).expect("queued");

        let mut out = [0.0; 7];
        engine.render_interleaved(&mut out);
        assert_eq!(&out[..6], &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(out[6], 0.0);
        assert_eq!(engine.clock().frame(), 3);
    }

    #[test]
    fn planar_blocks() {
        let (mut engine, mut handle) = engine(100);
        handle.set_output(Constant(0.5)).expect("queued");

        let mut output = AudioOutput::new(2, 4);
        engine.process_block(&mut output, 8);
        assert!(output.buffers.iter().flatten().all(|&s| s == 0.5));
        assert_eq!(engine.clock().frame(), 4);
    }

    #[test]
    fn handle_notices_a_dropped_engine() {
        let (engine, mut handle) = engine(100);
        drop(engine);
        assert!(!handle.is_connected());
        assert_eq!(
            handle.set_output(Constant(1.0)),
            Err(EngineError::Disconnected)
        );
    }

    #[test]
    fn replacements_in_flight_are_bounded() {
        let (mut engine, mut handle) = Engine::new(
            EngineConfig::default()
                .with_sample_rate(100)
                .with_control_queue_capacity(1),
        )
        .expect("valid config");
        handle.set_output(Constant(1.0)).expect("queued");
        assert_eq!(
            handle.set_output(Constant(2.0)),
            Err(EngineError::QueueFull)
        );

        // the engine takes the pending one and frees the slot
        assert_eq!(engine.next_sample(), 1.0);
        handle.set_output(Constant(2.0)).expect("queued");
        assert_eq!(engine.next_sample(), 2.0);
    }
}
