//! Procedural chiptune synthesizer (sonant-x model)
//!
//! Songs are rendered into biased 16-bit stereo byte buffers:
//! - Each track renders its notes into a private channel buffer
//! - A cross-feed delay runs over the channel buffer
//! - The channel is summed into the master buffer with 16-bit wraparound
//!
//! Every long pass is resumable and runs in bounded slices (see [`Slice`]),
//! so a frame loop can generate a whole song without stalling.

mod oscillator;
mod instrument;
mod buffer;
mod voice;
mod delay;
mod slice;
mod song;

pub use oscillator::*;
pub use instrument::*;
pub use buffer::*;
pub use voice::*;
pub use delay::*;
pub use slice::*;
pub use song::*;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44100;

/// Interleaved channels (stereo)
pub const CHANNELS: usize = 2;

/// Bytes per stereo frame (two 16-bit words)
pub const FRAME_BYTES: usize = CHANNELS * 2;

/// Rows in every pattern
pub const PATTERN_ROWS: usize = 32;

/// Row length in samples when a song leaves it at 0
pub const DEFAULT_ROW_LEN: u32 = 5605;

/// Default wall-clock budget of one generation slice
pub const MAX_SLICE_MS: u64 = 33;

/// Inner-loop iterations between clock reads in timed slices
pub const CHECK_INTERVAL: u32 = 1000;
