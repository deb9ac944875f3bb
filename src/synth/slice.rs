//! Bounded work slices and resumable jobs
//!
//! A long pass keeps its loop cursor in a struct. Each call to `resume`
//! runs until the slice is spent, then returns [`Step::Pending`] so the
//! host can draw a frame before the next call.

use std::time::{Duration, Instant};

use super::CHECK_INTERVAL;

#[derive(Debug, Clone, Copy)]
enum Budget {
    Time { start: Instant, limit: Duration },
    Work { remaining: u64 },
    Unbounded,
}

/// The budget for one resume call
#[derive(Debug, Clone)]
pub struct Slice {
    budget: Budget,
    count: u32,
}

impl Slice {
    /// Wall-clock budget starting now. `Instant` is not available on
    /// wasm32-unknown-unknown, use [`Slice::work`] there.
    pub fn timed(limit: Duration) -> Self {
        Self {
            budget: Budget::Time { start: Instant::now(), limit },
            count: 0,
        }
    }

    /// Deterministic budget of `units` loop iterations (at least one)
    pub fn work(units: u64) -> Self {
        Self {
            budget: Budget::Work { remaining: units.max(1) },
            count: 0,
        }
    }

    /// Never yields
    pub fn unbounded() -> Self {
        Self { budget: Budget::Unbounded, count: 0 }
    }

    /// Record one inner-loop iteration. Returns true once the slice is
    /// spent; timed slices only read the clock every [`CHECK_INTERVAL`]
    /// iterations.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.count = self.count.wrapping_add(1);
        match &mut self.budget {
            Budget::Time { start, limit } => {
                self.count % CHECK_INTERVAL == 0 && start.elapsed() > *limit
            }
            Budget::Work { remaining } => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            Budget::Unbounded => false,
        }
    }

    /// Like [`Slice::tick`] but reads the clock on every call, for loops
    /// whose iterations are expensive (one pattern row per iteration).
    #[inline]
    pub fn tick_checked(&mut self) -> bool {
        if let Budget::Time { start, limit } = self.budget {
            self.count = self.count.wrapping_add(1);
            return start.elapsed() > limit;
        }
        self.tick()
    }

    /// Iterations recorded so far
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Outcome of one resume call
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// Slice spent, call again
    Pending,
    Ready(T),
}

impl<T> Step<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Step::Ready(_))
    }
}

/// A pass that runs across many slices. There is no cancellation:
/// dropping the job abandons it.
pub trait Job {
    type Output;

    /// Continue from the saved cursor until done or the slice is spent.
    /// Resuming after `Ready` returns `Pending` forever.
    fn resume(&mut self, slice: &mut Slice) -> Step<Self::Output>;

    /// Fraction of the work done, in `[0, 1]`
    fn progress(&self) -> f32;
}

/// Drive a job to completion, taking a fresh slice for every resume
pub fn run_to_end<J: Job>(job: &mut J, mut next_slice: impl FnMut() -> Slice) -> J::Output {
    let mut slices = 0u32;
    loop {
        let mut slice = next_slice();
        slices += 1;
        if let Step::Ready(out) = job.resume(&mut slice) {
            log::debug!("job finished after {} slices", slices);
            return out;
        }
    }
}
