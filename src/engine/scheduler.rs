use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use tracing::{trace, warn};

use crate::{
    error::{DispatchError, SynthError},
    synth::{NoteEvent, NoteId, SynthHandle},
    Time,
};

struct Scheduled {
    at: Time,
    seq: u64,
    event: NoteEvent,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // equal times keep insertion order
        self.at
            .total_cmp(&other.at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Control-side timeline of notes waiting for their start time.
///
/// Call [`dispatch_due`](Scheduler::dispatch_due) regularly with the
/// engine's current time; anything due is forwarded to the synth and
/// starts on the next rendered frame.
#[derive(Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, at: Time, event: NoteEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled { at, seq, event }));
    }

    /// Start time of the earliest waiting note.
    pub fn next_due(&self) -> Option<Time> {
        self.queue.peek().map(|Reverse(s)| s.at)
    }

    /// Send every note due at or before `now`.
    ///
    /// Stops early (leaving the rest queued) when the synth's control queue
    /// is full. A disconnected synth stops dispatch with the note still
    /// queued; an invalid note is removed. Either way the error carries the
    /// ids sent before it.
    pub fn dispatch_due(
        &mut self,
        now: Time,
        synth: &mut SynthHandle,
    ) -> Result<Vec<NoteId>, DispatchError> {
        let mut sent = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.at > now {
                break;
            }
            if synth.capacity() == 0 {
                trace!(waiting = self.queue.len(), "synth queue full, dispatch deferred");
                break;
            }
            if !synth.is_connected() {
                return Err(DispatchError {
                    sent,
                    source: SynthError::Disconnected,
                });
            }
            if let Err(source) = next.event.validate() {
                let at = next.at;
                self.queue.pop();
                warn!(at, error = %source, "invalid scheduled note removed");
                return Err(DispatchError { sent, source });
            }

            let Some(Reverse(scheduled)) = self.queue.pop() else {
                break;
            };
            let at = scheduled.at;
            match synth.play(scheduled.event) {
                Ok(id) => {
                    trace!(note = %id, at, now, "scheduled note dispatched");
                    sent.push(id);
                }
                Err(source) => return Err(DispatchError { sent, source }),
            }
        }
        Ok(sent)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
