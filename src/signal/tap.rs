use rtrb::{Consumer, Producer, RingBuffer};

use crate::{signal::Signal, Sample, Time};

/// One captured observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapReading {
    pub time: Time,
    pub sample: Sample,
}

/// Pass-through probe that copies every n-th sample to another thread.
///
/// The wrapped signal's output is returned unchanged. Readings go into a
/// bounded ring; if the reader falls behind, readings are dropped rather
/// than stalling the audio thread. Printing or plotting happens on the
/// consumer side.
pub struct Tap<S> {
    signal: S,
    every: usize,
    count: usize,
    tx: Producer<TapReading>,
}

impl<S: Signal> Tap<S> {
    /// Wrap `signal`, reporting every `every`-th sample (`0` is treated as `1`).
    pub fn new(signal: S, every: usize, capacity: usize) -> (Self, Consumer<TapReading>) {
        let (tx, rx) = RingBuffer::new(capacity.max(1));
        let tap = Self {
            signal,
            every: every.max(1),
            count: 0,
            tx,
        };
        (tap, rx)
    }

    pub fn inner(&self) -> &S {
        &self.signal
    }
}

impl<S: Signal> Signal for Tap<S> {
    #[inline]
    fn sample(&mut self, time: Time) -> Sample {
        let sample = self.signal.sample(time);
        if self.count % self.every == 0 {
            // Full ring: the reading is lost, the audio keeps flowing.
            let _ = self.tx.push(TapReading { time, sample });
        }
        self.count = self.count.wrapping_add(1);
        sample
    }
}
