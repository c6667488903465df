// Purpose: Voice management and polyphony
// A voice is oscillator × envelope; the synth is a fixed arena of voices
// fed by a lock-free control queue.

pub mod message;
pub mod poly;
pub mod voice;

pub use message::{NoteEvent, NoteId, NoteLifetime, SynthMessage, SynthNotification};
pub use poly::{LiveVoices, PolySynth, SynthConfig, SynthHandle, MAX_VOICES};
pub use voice::{Voice, VoiceState};
