//! jamkit: a tiny game-jam engine
//!
//! - Indexed-color software rasterizer with paged framebuffer (32-color palette)
//! - Sonant-style procedural synthesizer rendering songs in resumable slices
//! - Voice mixer and cpal output for playback
//! - Menu / game / game over state machine

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod rasterizer;
pub mod synth;

pub use config::JamConfig;
pub use error::{JamError, Result};
