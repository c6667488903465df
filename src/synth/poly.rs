use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    dsp::envelope::Envelope,
    error::SynthError,
    signal::Signal,
    synth::{
        message::{AudioEvent, NoteEvent, NoteId, SynthMessage, SynthNotification},
        voice::{Voice, VoiceState},
    },
    wave::SharedWave,
    Sample, Time,
};

/// Width of the live-voice mask.
pub const MAX_VOICES: usize = 64;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    /// Voice slots allocated up front, 1..=64
    pub max_voices: usize,
    /// Control → audio queue size
    pub control_queue_capacity: usize,
    /// Audio → control queue size
    pub notification_queue_capacity: usize,
}

impl SynthConfig {
    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_control_queue_capacity(mut self, capacity: usize) -> Self {
        self.control_queue_capacity = capacity;
        self
    }

    pub fn with_notification_queue_capacity(mut self, capacity: usize) -> Self {
        self.notification_queue_capacity = capacity;
        self
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_voices: 16,
            control_queue_capacity: 256,
            notification_queue_capacity: 1024,
        }
    }
}

/// Snapshot of which voice slots were sounding when it was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveVoices {
    mask: u64,
}

impl LiveVoices {
    pub fn from_mask(mask: u64) -> Self {
        Self { mask }
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn count(&self) -> usize {
        self.mask.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot < MAX_VOICES && self.mask & (1 << slot) != 0
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let mask = self.mask;
        (0..MAX_VOICES).filter(move |slot| mask & (1 << slot) != 0)
    }
}

/// Audio side of a polyphonic synth.
///
/// Owns every voice. Control messages are drained at the top of each
/// `sample` call, so a note starts exactly at the first frame after it was
/// sent. Nothing here blocks or allocates.
pub struct PolySynth {
    voices: Vec<Voice>,
    rx: Consumer<SynthMessage>,
    tx: Producer<AudioEvent>,
    live: Arc<AtomicU64>,
    ledger: Arc<NoteLedger>,
    lost: Arc<AtomicU64>,
    next_age: u64,
}

/// Lossless view of note ownership, shared with the control side.
///
/// `occupants[slot]` holds `id + 1` of the note in that slot (0 when free)
/// and `accepted` is one past the last note id the audio side has taken
/// off the control queue. Terminal events are pushed before either cell
/// changes, so a note that is accepted but owns no slot has ended, and
/// its notification is either already in the ring or was lost.
struct NoteLedger {
    occupants: Box<[AtomicU64]>,
    accepted: AtomicU64,
}

impl NoteLedger {
    fn new(voices: usize) -> Self {
        Self {
            occupants: (0..voices).map(|_| AtomicU64::new(0)).collect(),
            accepted: AtomicU64::new(0),
        }
    }

    /// Ids in `pending` that have ended according to the audio side.
    fn ended(&self, pending: &BTreeSet<NoteId>) -> Vec<NoteId> {
        let accepted = self.accepted.load(Ordering::Acquire);
        let owned: Vec<u64> = self
            .occupants
            .iter()
            .map(|cell| cell.load(Ordering::Acquire))
            .filter(|&cell| cell != 0)
            .map(|cell| cell - 1)
            .collect();
        pending
            .iter()
            .copied()
            .filter(|id| id.0 < accepted && !owned.contains(&id.0))
            .collect()
    }
}

impl PolySynth {
    pub fn new(
        config: SynthConfig,
        wave: SharedWave,
        envelope: Envelope,
    ) -> Result<(PolySynth, SynthHandle), SynthError> {
        if config.max_voices == 0 || config.max_voices > MAX_VOICES {
            return Err(SynthError::InvalidVoiceCount(config.max_voices));
        }

        let (control_tx, control_rx) = RingBuffer::new(config.control_queue_capacity.max(1));
        let (event_tx, event_rx) = RingBuffer::new(config.notification_queue_capacity.max(1));
        let live = Arc::new(AtomicU64::new(0));
        let ledger = Arc::new(NoteLedger::new(config.max_voices));
        let lost = Arc::new(AtomicU64::new(0));

        let voices = (0..config.max_voices)
            .map(|_| Voice::new(wave.clone(), envelope.clone()))
            .collect();

        let synth = PolySynth {
            voices,
            rx: control_rx,
            tx: event_tx,
            live: live.clone(),
            ledger: ledger.clone(),
            lost: lost.clone(),
            next_age: 0,
        };
        let handle = SynthHandle {
            tx: control_tx,
            rx: event_rx,
            live,
            ledger,
            lost,
            next_id: 0,
            pending: BTreeSet::new(),
            lost_reported: 0,
        };
        Ok((synth, handle))
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Live slots as the audio side sees them right now.
    pub fn live_voices(&self) -> LiveVoices {
        LiveVoices::from_mask(self.mask())
    }

    fn drain(&mut self, time: Time) {
        while let Ok(message) = self.rx.pop() {
            match message {
                SynthMessage::Play { id, event } => {
                    self.start(id, event, time);
                    self.ledger.accepted.store(id.0 + 1, Ordering::Release);
                }
                SynthMessage::StopAll => self.stop_all(),
            }
        }
    }

    fn start(&mut self, id: NoteId, event: NoteEvent, time: Time) {
        let Some(slot) = self.allocate() else {
            emit(
                &mut self.tx,
                &self.lost,
                AudioEvent::Dropped {
                    id,
                    retired: event.frequency,
                },
            );
            return;
        };

        let age = self.next_age;
        self.next_age += 1;

        let voice = &mut self.voices[slot];
        if let Some(stolen) = voice.cancel() {
            emit(&mut self.tx, &self.lost, AudioEvent::Cancelled { id: stolen });
        }
        let (lifetime, previous) = voice.play_as(id, event, time, age);
        if !previous.is_fixed() {
            emit(&mut self.tx, &self.lost, AudioEvent::Retired(previous));
        }
        emit(
            &mut self.tx,
            &self.lost,
            AudioEvent::Started { id, slot, lifetime },
        );
        self.publish();
    }

    fn stop_all(&mut self) {
        for voice in &mut self.voices {
            if let Some(id) = voice.cancel() {
                emit(&mut self.tx, &self.lost, AudioEvent::Cancelled { id });
            }
        }
        self.publish();
    }

    fn allocate(&self) -> Option<usize> {
        // First pass: find free voice index
        if let Some(slot) = self.voices.iter().position(|v| v.is_free()) {
            return Some(slot);
        }

        // Second pass: steal oldest releasing voice
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by_key(|(_, v)| v.age())
            .map(|(slot, _)| slot)
    }

    fn mask(&self) -> u64 {
        self.voices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_free())
            .fold(0, |mask, (slot, _)| mask | (1 << slot))
    }

    fn publish(&self) {
        for (voice, cell) in self.voices.iter().zip(self.ledger.occupants.iter()) {
            cell.store(voice.note().map_or(0, |id| id.0 + 1), Ordering::Release);
        }
        self.live.store(self.mask(), Ordering::Release);
    }
}

/// Push to the notification ring. A full ring drops the event here and
/// counts it.
fn emit(tx: &mut Producer<AudioEvent>, lost: &AtomicU64, event: AudioEvent) {
    if tx.push(event).is_err() {
        lost.fetch_add(1, Ordering::Relaxed);
    }
}

impl Signal for PolySynth {
    fn sample(&mut self, time: Time) -> Sample {
        self.drain(time);

        let mut out = 0.0;
        let mut freed = false;
        for voice in &mut self.voices {
            if voice.is_free() {
                continue;
            }
            let note = voice.note();
            out += voice.sample(time);
            if voice.is_free() {
                freed = true;
                if let Some(id) = note {
                    emit(&mut self.tx, &self.lost, AudioEvent::Finished { id, at: time });
                }
            }
        }
        if freed {
            self.publish();
        }
        out
    }
}

/// Control side of a [`PolySynth`].
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
    rx: Consumer<AudioEvent>,
    live: Arc<AtomicU64>,
    ledger: Arc<NoteLedger>,
    lost: Arc<AtomicU64>,
    next_id: u64,
    pending: BTreeSet<NoteId>,
    lost_reported: u64,
}

impl SynthHandle {
    /// Schedule a note. It starts at the next sampled frame.
    pub fn play(&mut self, event: NoteEvent) -> Result<NoteId, SynthError> {
        event.validate()?;
        if self.tx.is_abandoned() {
            return Err(SynthError::Disconnected);
        }

        let id = NoteId(self.next_id);
        let duration = event.duration;
        if self.tx.push(SynthMessage::Play { id, event }).is_err() {
            warn!(note = %id, "synth control queue full, note not sent");
            return Err(SynthError::QueueFull);
        }
        debug!(note = %id, duration, "note dispatched");
        self.next_id += 1;
        self.pending.insert(id);
        Ok(id)
    }

    /// Schedule several notes to start on the same frame, each with its
    /// own independent lifetime. Nothing is sent unless all of them fit.
    pub fn play_all(
        &mut self,
        events: impl IntoIterator<Item = NoteEvent>,
    ) -> Result<Vec<NoteId>, SynthError> {
        let events: Vec<NoteEvent> = events.into_iter().collect();
        for event in &events {
            event.validate()?;
        }
        if self.tx.is_abandoned() {
            return Err(SynthError::Disconnected);
        }
        if self.tx.slots() < events.len() {
            warn!(
                notes = events.len(),
                free = self.tx.slots(),
                "synth control queue cannot take the whole batch"
            );
            return Err(SynthError::QueueFull);
        }
        events.into_iter().map(|event| self.play(event)).collect()
    }

    /// Cancel every sounding note immediately.
    pub fn stop(&mut self) -> Result<(), SynthError> {
        if self.tx.is_abandoned() {
            return Err(SynthError::Disconnected);
        }
        self.tx
            .push(SynthMessage::StopAll)
            .map_err(|_| SynthError::QueueFull)?;
        info!(pending = self.pending.len(), "stopping all notes");
        Ok(())
    }

    /// Last snapshot published by the audio side.
    pub fn live_voices(&self) -> LiveVoices {
        LiveVoices::from_mask(self.live.load(Ordering::Acquire))
    }

    /// Collect what happened to notes since the last poll.
    ///
    /// Frequency signals retired by the audio side are dropped here. Once
    /// the audio side is gone every note still pending resolves as
    /// `Cancelled`, exactly once. A note whose end was lost to a full
    /// notification ring also resolves as `Cancelled`.
    pub fn poll(&mut self) -> Vec<SynthNotification> {
        // read before draining: anything that ended before this point has
        // its notification in the ring already, unless it was lost
        let ended = self.ledger.ended(&self.pending);

        let mut notifications = Vec::new();
        while let Ok(event) = self.rx.pop() {
            let notification = match event {
                AudioEvent::Started { id, slot, lifetime } => {
                    SynthNotification::Started { id, slot, lifetime }
                }
                AudioEvent::Finished { id, at } => SynthNotification::Finished { id, at },
                AudioEvent::Dropped { id, retired } => {
                    warn!(note = %id, "no free voice, note dropped");
                    drop(retired);
                    SynthNotification::Dropped { id }
                }
                AudioEvent::Cancelled { id } => SynthNotification::Cancelled { id },
                AudioEvent::Retired(param) => {
                    drop(param);
                    continue;
                }
            };
            if notification.is_terminal() && !self.pending.remove(&notification.id()) {
                continue;
            }
            notifications.push(notification);
        }

        let lost = self.lost.load(Ordering::Relaxed);
        if lost > self.lost_reported {
            warn!(
                lost = lost - self.lost_reported,
                "notification queue overflowed, events lost"
            );
            self.lost_reported = lost;
        }

        for id in ended {
            if self.pending.remove(&id) {
                debug!(note = %id, "note ended without a notification");
                notifications.push(SynthNotification::Cancelled { id });
            }
        }

        if self.rx.is_abandoned() && !self.pending.is_empty() {
            info!(notes = self.pending.len(), "audio side gone, cancelling pending notes");
            notifications.extend(
                std::mem::take(&mut self.pending)
                    .into_iter()
                    .map(|id| SynthNotification::Cancelled { id }),
            );
        }
        notifications
    }

    /// Notes sent whose lifetime has not been reported as over.
    pub fn pending(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_abandoned()
    }

    /// Free control queue slots.
    pub fn capacity(&self) -> usize {
        self.tx.slots()
    }

    /// Events the audio side could not report because the ring was full.
    pub fn lost_notifications(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }
}
