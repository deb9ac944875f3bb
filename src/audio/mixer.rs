//! Voice mixer
//!
//! Plays finished [`StereoBuffer`]s with a playback rate, a stereo pan
//! and an optional loop, like a minimal Web Audio buffer source graph.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::synth::StereoBuffer;

/// Handle to a playing voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(u64);

struct Voice {
    id: VoiceId,
    buffer: Arc<StereoBuffer>,
    position: f64,
    rate: f64,
    pan: f32,
    gain: f32,
    looping: bool,
}

/// Equal-power pan of a stereo pair, as a Web Audio `StereoPannerNode`
/// does it for two-channel input. `pan` is clamped to `[-1, 1]`.
#[inline]
pub fn pan_stereo(left: f32, right: f32, pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    if pan <= 0.0 {
        let x = (pan + 1.0) * FRAC_PI_2;
        (left + right * x.cos(), right * x.sin())
    } else {
        let x = pan * FRAC_PI_2;
        (left * x.cos(), right + left * x.sin())
    }
}

pub struct Mixer {
    voices: Vec<Voice>,
    next_id: u64,
    /// Gain applied after all voices are summed
    pub master: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self { voices: Vec::new(), next_id: 0, master: 1.0 }
    }

    /// Start playing `buffer`. `rate` scales playback speed (and pitch),
    /// `pan` runs from -1 (left) to 1 (right).
    pub fn play(&mut self, buffer: Arc<StereoBuffer>, rate: f32, pan: f32, looping: bool) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push(Voice {
            id,
            buffer,
            position: 0.0,
            rate: rate.max(0.0) as f64,
            pan,
            gain: 1.0,
            looping,
        });
        id
    }

    /// Returns false if the voice already finished
    pub fn set_volume(&mut self, id: VoiceId, gain: f32) -> bool {
        match self.voices.iter_mut().find(|v| v.id == id) {
            Some(voice) => {
                voice.gain = gain;
                true
            }
            None => false,
        }
    }

    pub fn stop(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|v| v.id != id);
        self.voices.len() != before
    }

    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|v| v.id == id)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Fill interleaved stereo `out`, overwriting it. Voices that run off
    /// the end of a non-looping buffer are retired.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let frames = voice.buffer.frames();
            if frames == 0 {
                voice.looping = false;
                voice.position = 0.0;
                continue;
            }
            for frame in out.chunks_exact_mut(2) {
                let mut index = voice.position as usize;
                if index >= frames {
                    if !voice.looping {
                        break;
                    }
                    voice.position %= frames as f64;
                    index = voice.position as usize;
                }
                let (l, r) = voice.buffer.frame(index);
                let (l, r) = pan_stereo(l, r, voice.pan);
                frame[0] += l * voice.gain;
                frame[1] += r * voice.gain;
                voice.position += voice.rate;
            }
        }
        self.voices.retain(|v| v.looping || (v.position as usize) < v.buffer.frames());
        if self.master != 1.0 {
            for s in out.iter_mut() {
                *s *= self.master;
            }
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> Arc<StereoBuffer> {
        let samples = (0..frames).flat_map(|i| [i as f32 / 100.0, -(i as f32) / 100.0]).collect();
        Arc::new(StereoBuffer { samples })
    }

    #[test]
    fn test_pan_centre_passes_through() {
        let (l, r) = pan_stereo(0.5, -0.25, 0.0);
        assert!((l - 0.5).abs() < 1e-6);
        assert!((r + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_pan_hard_sides() {
        let (l, r) = pan_stereo(0.5, 0.25, -1.0);
        assert!((l - 0.75).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
        let (l, r) = pan_stereo(0.5, 0.25, 3.0);
        assert!(l.abs() < 1e-6);
        assert!((r - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_one_shot_retires() {
        let mut mixer = Mixer::new();
        let id = mixer.play(ramp(3), 1.0, 0.0, false);
        let mut out = [9.0f32; 10];
        mixer.render(&mut out);
        assert!((out[4] - 0.02).abs() < 1e-6);
        assert_eq!(&out[6..], &[0.0; 4]);
        assert!(!mixer.is_playing(id));
        assert!(!mixer.set_volume(id, 0.5));
    }

    #[test]
    fn test_loop_and_rate() {
        let mut mixer = Mixer::new();
        let id = mixer.play(ramp(4), 2.0, 0.0, true);
        let mut out = [0.0f32; 8];
        mixer.render(&mut out);
        // Frames 0, 2, 0, 2
        assert!((out[2] - 0.02).abs() < 1e-6);
        assert!(out[4].abs() < 1e-6);
        assert!(mixer.is_playing(id));
        assert!(mixer.stop(id));
        assert_eq!(mixer.voice_count(), 0);
    }

    #[test]
    fn test_voices_sum_with_gain() {
        let mut mixer = Mixer::new();
        let a = mixer.play(ramp(8), 1.0, 0.0, false);
        mixer.play(ramp(8), 1.0, 0.0, false);
        mixer.set_volume(a, 0.5);
        let mut out = [0.0f32; 4];
        mixer.render(&mut out);
        assert!((out[2] - 0.015).abs() < 1e-6);
        assert_eq!(mixer.voice_count(), 2);
    }
}
