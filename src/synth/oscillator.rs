//! Oscillator waveforms and note tuning

use serde::{Deserialize, Serialize};

/// Phase-to-radians factor used by every sine evaluation
const TAU: f64 = 6.283184;

/// Waveform of an oscillator or LFO. The phase is in cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [Waveform::Sine, Waveform::Square, Waveform::Saw, Waveform::Triangle];

    #[inline]
    pub fn eval(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => sine(phase),
            Waveform::Square => {
                if sine(phase) < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
            Waveform::Saw => (phase % 1.0) - 0.5,
            Waveform::Triangle => {
                let v = (phase % 1.0) * 4.0;
                if v < 2.0 {
                    v - 1.0
                } else {
                    3.0 - v
                }
            }
        }
    }
}

#[inline]
pub fn sine(phase: f64) -> f64 {
    (phase * TAU).sin()
}

/// Frequency of note `n` in cycles per sample. Note 128 is 1/256.
#[inline]
pub fn note_freq(n: f64) -> f64 {
    0.00390625 * 1.059463094f64.powf(n - 128.0)
}
