//! Engine configuration
//!
//! Uses RON (Rusty Object Notation) like the song files. Every field has a
//! default, so a config file only needs to list what it changes:
//!
//! ```ron
//! (display: (width: 256, height: 256), audio: (slice_ms: 16))
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JamError, Result};
use crate::rasterizer::{BoundsPolicy, HEIGHT, PAGES, WIDTH};
use crate::synth::MAX_SLICE_MS;

/// Framebuffer geometry and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    /// Number of framebuffer pages (page 0 is the display page)
    pub pages: usize,
    /// Which edge of the screen `pset` treats as drawable
    pub bounds: BoundsPolicy,
    /// Initial window scale factor for the demo
    pub scale: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            pages: PAGES,
            bounds: BoundsPolicy::default(),
            scale: 3,
        }
    }
}

/// Song generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Wall-clock budget of one generation slice, in milliseconds
    pub slice_ms: u64,
    /// Seed for the noise oscillator
    pub noise_seed: u64,
    /// Start the demo song as soon as it has been generated
    pub autoplay: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            slice_ms: MAX_SLICE_MS,
            noise_seed: 0x5eed,
            autoplay: true,
        }
    }
}

impl AudioConfig {
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JamConfig {
    pub display: DisplayConfig,
    pub audio: AudioConfig,
}

impl JamConfig {
    /// Load and validate a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Parse and validate a config from a RON string
    pub fn from_ron(s: &str) -> Result<Self> {
        let config: JamConfig = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());
        fs::write(path, ron::ser::to_string_pretty(self, pretty)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.display;
        if d.width == 0 || d.height == 0 {
            return Err(JamError::Config(format!(
                "display size must be non-zero, got {}x{}",
                d.width, d.height
            )));
        }
        if d.pages < 2 {
            return Err(JamError::Config(format!(
                "need a target and a source page, got {} page(s)",
                d.pages
            )));
        }
        if self.audio.slice_ms == 0 {
            return Err(JamError::Config("slice_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}
