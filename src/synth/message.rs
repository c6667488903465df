use crate::{error::SynthError, signal::Param, Sample, Time};

/// Identifies one played note for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(pub u64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A note to play: a frequency input held for `duration` seconds, followed
/// by the envelope's release.
#[derive(Debug)]
pub struct NoteEvent {
    pub frequency: Param,
    pub duration: Time,
}

impl NoteEvent {
    /// A note at a fixed frequency in Hz.
    pub fn new(frequency: Sample, duration: Time) -> Self {
        Self {
            frequency: Param::Fixed(frequency),
            duration,
        }
    }

    /// A note whose frequency follows a signal (glide, vibrato, FM).
    pub fn modulated(frequency: impl Into<Param>, duration: Time) -> Self {
        Self {
            frequency: frequency.into(),
            duration,
        }
    }

    pub fn validate(&self) -> Result<(), SynthError> {
        if self.duration.is_finite() && self.duration >= 0.0 {
            Ok(())
        } else {
            Err(SynthError::InvalidDuration)
        }
    }
}

/// The scheduled lifetime of one note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteLifetime {
    /// Gate opens; the envelope's first sample is 0 here
    pub triggered_at: Time,
    /// Gate closes and the release begins
    pub release_at: Time,
    /// Release complete; the voice is free again
    pub ends_at: Time,
}

impl NoteLifetime {
    pub fn new(triggered_at: Time, duration: Time, release: Time) -> Self {
        let release_at = triggered_at + duration;
        Self {
            triggered_at,
            release_at,
            ends_at: release_at + release,
        }
    }

    pub fn contains(&self, time: Time) -> bool {
        time >= self.triggered_at && time < self.ends_at
    }
}

/// Control → audio.
#[derive(Debug)]
pub enum SynthMessage {
    Play { id: NoteId, event: NoteEvent },
    StopAll,
}

/// Audio → control. Carries retired frequency inputs so they are freed
/// on the control thread.
#[derive(Debug)]
pub(crate) enum AudioEvent {
    Started {
        id: NoteId,
        slot: usize,
        lifetime: NoteLifetime,
    },
    Finished {
        id: NoteId,
        at: Time,
    },
    Dropped {
        id: NoteId,
        retired: Param,
    },
    Cancelled {
        id: NoteId,
    },
    Retired(Param),
}

/// What happened to a note, as reported by [`SynthHandle::poll`](super::SynthHandle::poll).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthNotification {
    /// The note claimed a voice slot.
    Started {
        id: NoteId,
        slot: usize,
        lifetime: NoteLifetime,
    },
    /// The release completed and the voice was reclaimed.
    Finished { id: NoteId, at: Time },
    /// Every slot was busy and none was releasing.
    Dropped { id: NoteId },
    /// Stopped, stolen, or abandoned because the audio side went away.
    Cancelled { id: NoteId },
}

impl SynthNotification {
    pub fn id(&self) -> NoteId {
        match *self {
            SynthNotification::Started { id, .. }
            | SynthNotification::Finished { id, .. }
            | SynthNotification::Dropped { id }
            | SynthNotification::Cancelled { id } => id,
        }
    }

    /// The note will produce no further notifications.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SynthNotification::Started { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_validated() {
        assert!(NoteEvent::new(440.0, 0.0).validate().is_ok());
        assert_eq!(
            NoteEvent::new(440.0, -0.1).validate(),
            Err(SynthError::InvalidDuration)
        );
        assert_eq!(
            NoteEvent::new(440.0, Time::INFINITY).validate(),
            Err(SynthError::InvalidDuration)
        );
    }

    #[test]
    fn lifetime_spans_hold_and_release() {
        let lifetime = NoteLifetime::new(1.0, 0.5, 0.25);
        assert_eq!(lifetime.release_at, 1.5);
        assert_eq!(lifetime.ends_at, 1.75);
        assert!(lifetime.contains(1.0));
        assert!(!lifetime.contains(1.75));
    }
}
