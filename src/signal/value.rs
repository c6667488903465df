use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::{signal::Signal, Sample, Time};

/// A level set from the control thread and read by the audio thread.
///
/// The sample is stored as `f32` bits in an atomic, so a read never sees a
/// torn value and neither side blocks. Clones share the same cell: keep one
/// clone on the control side, hand another to a signal graph.
#[derive(Debug, Clone)]
pub struct Value {
    bits: Arc<AtomicU32>,
}

impl Value {
    pub fn new(initial: Sample) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(initial.to_bits())),
        }
    }

    #[inline]
    pub fn set(&self, value: Sample) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    #[inline]
    pub fn get(&self) -> Sample {
        Sample::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Signal for Value {
    #[inline]
    fn sample(&mut self, _time: Time) -> Sample {
        self.get()
    }
}

/// A gate that switches between `0` and a target level.
///
/// Feed its signal into an envelope's gate input; `activate` opens the gate,
/// `deactivate` closes it. Timed impulses belong on the control side (see
/// `engine::Scheduler`), never in a sleep on the audio path.
#[derive(Debug, Clone)]
pub struct Trigger {
    value: Value,
    target: Sample,
}

impl Trigger {
    /// A closed gate that opens to `target`.
    pub fn new(target: Sample) -> Self {
        Self {
            value: Value::new(0.0),
            target,
        }
    }

    pub fn target(&self) -> Sample {
        self.target
    }

    pub fn activate(&self) {
        self.value.set(self.target);
    }

    pub fn deactivate(&self) {
        self.value.set(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.value.get() > 0.0
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Signal for Trigger {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        self.value.sample(time)
    }
}
