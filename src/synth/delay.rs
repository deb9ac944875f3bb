//! Cross-feed delay

use super::buffer::{SampleBuffer, BIAS};
use super::instrument::Delay;
use super::slice::Slice;
use super::FRAME_BYTES;

/// Resumable delay pass over a channel buffer.
///
/// Each frame `n + tap` gets `amount` times the opposite channel of frame
/// `n` added to it. The buffer is updated in place, walking forwards, so
/// earlier echoes feed later ones (ping-pong between the channels).
#[derive(Debug, Clone)]
pub struct DelayPass {
    tap: usize,
    amount: f64,
    frames: usize,
    n: usize,
}

impl DelayPass {
    pub fn new(delay: &Delay, row_len: u32, frames: usize) -> Self {
        Self {
            tap: (delay.time as usize * row_len as usize) >> 1,
            amount: delay.amount as f64 / 255.0,
            frames,
            n: 0,
        }
    }

    fn end(&self) -> usize {
        self.frames.saturating_sub(self.tap)
    }

    pub fn is_done(&self) -> bool {
        self.n >= self.end()
    }

    pub fn progress(&self) -> f32 {
        match self.end() {
            0 => 1.0,
            end => self.n as f32 / end as f32,
        }
    }

    /// Run until done (true) or the slice is spent (false)
    pub fn run(&mut self, buf: &mut SampleBuffer, slice: &mut Slice) -> bool {
        let end = self.end().min(buf.frames().saturating_sub(self.tap));
        while self.n < end {
            let src = FRAME_BYTES * self.n;
            let dst = FRAME_BYTES * (self.n + self.tap);

            let left = buf.word(dst) as f64 + (buf.word(src + 2) - BIAS) as f64 * self.amount;
            buf.store(dst, left);
            let right = buf.word(dst + 2) as f64 + (buf.word(src) - BIAS) as f64 * self.amount;
            buf.store(dst + 2, right);

            self.n += 1;
            if slice.tick() {
                return self.is_done();
            }
        }
        self.n = self.n.max(self.end());
        true
    }
}

/// Apply the delay to a whole buffer in one go
pub fn apply_delay(buf: &mut SampleBuffer, delay: &Delay, row_len: u32) {
    let mut pass = DelayPass::new(delay, row_len, buf.frames());
    pass.run(buf, &mut Slice::unbounded());
}
