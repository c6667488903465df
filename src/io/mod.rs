// Purpose - device-facing buffer layouts

/// Planar (one buffer per channel) output block.
#[derive(Debug, Default, Clone)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Frames in the shortest channel.
    pub fn frames(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
    }

    /// Write frames as `[l0, r0, l1, r1, ...]`. Stops at whichever runs
    /// out first, the planar frames or `out`. Returns frames written.
    pub fn interleave_into(&self, out: &mut [f32]) -> usize {
        let channels = self.channels();
        if channels == 0 {
            return 0;
        }
        let frames = self.frames().min(out.len() / channels);
        for (frame, chunk) in out.chunks_exact_mut(channels).take(frames).enumerate() {
            for (slot, buffer) in chunk.iter_mut().zip(&self.buffers) {
                *slot = buffer[frame];
            }
        }
        frames
    }
}
