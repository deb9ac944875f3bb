//! Playback of rendered audio
//!
//! [`Mixer`] is platform independent and unit tested. [`AudioOutput`]
//! drives it from a cpal device callback on native targets.

mod mixer;
#[cfg(not(target_arch = "wasm32"))]
mod output;

pub use mixer::*;
#[cfg(not(target_arch = "wasm32"))]
pub use output::AudioOutput;
