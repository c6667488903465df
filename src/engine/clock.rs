use crate::Time;

/// Converts a running frame index into stream time.
///
/// Time is computed from the frame count rather than accumulated, so it
/// does not drift over long sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    frame: u64,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frame: 0,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Index of the next frame to render.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Stream time of the next frame.
    pub fn time(&self) -> Time {
        self.time_of(self.frame)
    }

    pub fn time_of(&self, frame: u64) -> Time {
        (frame as f64 / self.sample_rate as f64) as Time
    }

    /// Return the current frame's time and move on to the next frame.
    pub fn tick(&mut self) -> Time {
        let time = self.time();
        self.frame += 1;
        time
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }
}
