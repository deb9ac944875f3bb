//! Audio device output using cpal

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use super::mixer::Mixer;
use crate::error::{JamError, Result};
use crate::synth::SAMPLE_RATE;

/// Owns the output stream and the mixer it renders from.
///
/// The mixer is shared with the audio thread; lock it briefly from the
/// main thread to start or stop voices.
pub struct AudioOutput {
    mixer: Arc<Mutex<Mixer>>,
    _stream: Stream,
}

impl AudioOutput {
    /// Open the default output device at 44100 Hz stereo
    pub fn open() -> Result<Self> {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let stream = Self::init_audio_stream(Arc::clone(&mixer))?;
        Ok(Self { mixer, _stream: stream })
    }

    fn init_audio_stream(mixer: Arc<Mutex<Mixer>>) -> Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| JamError::Audio("no output device".to_string()))?;
        if let Ok(name) = device.name() {
            log::info!("audio output: {}", name);
        }

        let config = StreamConfig {
            channels: 2,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match mixer.lock() {
                    Ok(mut mixer) => mixer.render(data),
                    Err(_) => data.fill(0.0),
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| JamError::Audio(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| JamError::Audio(format!("failed to start output stream: {}", e)))?;
        Ok(stream)
    }

    /// Run `f` with the mixer locked. Returns `None` if the audio thread
    /// panicked while holding the lock.
    pub fn with_mixer<R>(&self, f: impl FnOnce(&mut Mixer) -> R) -> Option<R> {
        self.mixer.lock().ok().map(|mut m| f(&mut m))
    }
}
