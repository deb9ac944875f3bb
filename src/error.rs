//! Error type for the fallible edges of the engine
//!
//! Drawing and synthesis never fail: clipped pixels and out of range
//! samples are dropped silently. Only loading, saving, configuration and
//! audio device setup report errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Audio device error: {0}")]
    Audio(String),

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JamError>;
