//! Instrument, pattern and song records

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Waveform, DEFAULT_ROW_LEN, FRAME_BYTES, PATTERN_ROWS, SAMPLE_RATE};
use crate::error::Result;

/// One tone oscillator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oscillator {
    /// Octave, 8 is the reference octave
    pub octave: u8,
    /// Semitone offset added to the note
    pub semitone: u8,
    /// Fine detune, in units of 0.08%
    pub detune: u8,
    /// Scale the frequency by the squared envelope (pitch drops with it)
    pub envelope_pitch: bool,
    pub volume: u8,
    pub waveform: Waveform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Ramp-up length in samples
    pub attack: u32,
    /// Hold length in samples
    pub sustain: u32,
    /// Ramp-down length in samples
    pub release: u32,
    /// Output gain, multiplied by 39 when stored
    pub master: u8,
}

impl Default for Envelope {
    fn default() -> Self {
        Self { attack: 100, sustain: 0, release: 1000, master: 255 }
    }
}

impl Envelope {
    /// Samples a single note writes
    pub fn len(&self) -> u64 {
        self.attack as u64 + self.sustain as u64 + self.release as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Envelope level at sample `j` of a note: linear attack from 0,
    /// hold at 1, linear release towards 0
    #[inline]
    pub fn level(&self, j: u64) -> f64 {
        let (attack, hold_end) = (self.attack as u64, self.attack as u64 + self.sustain as u64);
        if j < attack {
            j as f64 / attack as f64
        } else if j >= hold_end {
            1.0 - (j - hold_end) as f64 / self.release as f64
        } else {
            1.0
        }
    }
}

/// State-variable filter output selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    /// Raw oscillator mix, filter state still advances
    #[default]
    None,
    HighPass,
    LowPass,
    BandPass,
    /// Low plus high
    Notch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub mode: FilterMode,
    /// Cutoff in Hz
    pub freq: u32,
    pub resonance: u8,
}

/// Cross-feed delay
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delay {
    /// Tap distance in half rows
    pub time: u32,
    /// Feed amount out of 255
    pub amount: u8,
}

/// Auto-pan LFO
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pan {
    /// Rate as a power of two relative to one cycle per 256 rows
    pub freq: u8,
    pub amount: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lfo {
    /// Modulate oscillator 1 frequency
    pub osc1_freq: bool,
    /// Modulate the filter cutoff
    pub fx_freq: bool,
    pub freq: u8,
    pub amount: u8,
    pub waveform: Waveform,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    pub osc1: Oscillator,
    pub osc2: Oscillator,
    /// White noise level out of 255
    pub noise_fader: u8,
    pub env: Envelope,
    pub filter: Filter,
    pub delay: Delay,
    pub pan: Pan,
    pub lfo: Lfo,
}

/// 32 rows of notes; 0 means no note on that row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub notes: Vec<u8>,
}

/// One instrument playing a sequence of patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub instrument: Instrument,
    /// Pattern number per sequence slot, 1-based, 0 is an empty slot
    pub sequence: Vec<u8>,
    pub patterns: Vec<Pattern>,
}

impl Track {
    /// Note on `row` of sequence slot `slot`, 0 for silence. Empty slots,
    /// missing patterns and short patterns are all silence.
    pub fn note(&self, slot: usize, row: usize) -> u8 {
        match self.sequence.get(slot) {
            Some(&cp) if cp > 0 => self
                .patterns
                .get(cp as usize - 1)
                .and_then(|p| p.notes.get(row))
                .copied()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Length in seconds
    pub length_secs: u32,
    /// Samples per row (0 picks the default)
    #[serde(default)]
    pub row_len: u32,
    /// One past the last sequence slot that plays
    pub end_pattern: u32,
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }

    /// The bundled demo song
    pub fn demo() -> Result<Self> {
        Self::from_ron(include_str!("../../assets/songs/song1.ron"))
    }

    pub fn row_len(&self) -> u32 {
        if self.row_len == 0 {
            DEFAULT_ROW_LEN
        } else {
            self.row_len
        }
    }

    /// Total song length in stereo frames
    pub fn frames(&self) -> usize {
        SAMPLE_RATE as usize * self.length_secs as usize
    }

    /// Size of the rendered master buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.frames() * FRAME_BYTES
    }

    /// Rows each track plays
    pub fn rows(&self) -> usize {
        self.end_pattern.saturating_sub(1) as usize * PATTERN_ROWS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_level() {
        let env = Envelope { attack: 10, sustain: 5, release: 20, master: 255 };
        assert_eq!(env.level(0), 0.0);
        assert_eq!(env.level(5), 0.5);
        assert_eq!(env.level(10), 1.0);
        assert_eq!(env.level(14), 1.0);
        assert_eq!(env.level(15), 1.0);
        assert_eq!(env.level(25), 0.5);
        assert_eq!(env.len(), 35);
    }

    #[test]
    fn test_envelope_len_does_not_overflow() {
        let env = Envelope { attack: 4_000_000_000, sustain: 400_000_000, release: u32::MAX, master: 255 };
        assert_eq!(env.len(), 4_400_000_000 + u32::MAX as u64);
        assert_eq!(env.level(4_200_000_000), 1.0);
        assert_eq!(env.level(4_400_000_000), 1.0);
        assert!(env.level(env.len() - 1) < 1e-9);
    }

    #[test]
    fn test_track_note_lookup() {
        let track = Track {
            sequence: vec![2, 0, 1, 7],
            patterns: vec![Pattern { notes: vec![100; 32] }, Pattern { notes: vec![0, 140] }],
            ..Default::default()
        };
        assert_eq!(track.note(0, 1), 140);
        assert_eq!(track.note(0, 0), 0);
        assert_eq!(track.note(0, 5), 0);
        assert_eq!(track.note(1, 3), 0);
        assert_eq!(track.note(2, 31), 100);
        assert_eq!(track.note(3, 0), 0);
        assert_eq!(track.note(9, 0), 0);
    }

    #[test]
    fn test_demo_song_parses() {
        let song = Song::demo().unwrap();
        assert_eq!(song.length_secs, 37);
        assert_eq!(song.row_len(), 5513);
        assert_eq!(song.end_pattern, 9);
        assert_eq!(song.tracks.len(), 8);
        assert_eq!(song.rows(), 8 * 32);

        let lead = &song.tracks[0].instrument;
        assert_eq!(lead.osc1.waveform, Waveform::Triangle);
        assert_eq!(lead.env.release, 13636);
        assert_eq!(lead.filter.mode, FilterMode::LowPass);
        assert_eq!(song.tracks[0].sequence, vec![1, 2, 0, 0, 1, 2, 1, 2]);
        assert!(song.tracks.iter().all(|t| t.patterns.iter().all(|p| p.notes.len() == 32)));
    }

    #[test]
    fn test_zero_row_len_uses_default() {
        let song = Song::from_ron("(length_secs: 1, end_pattern: 2, tracks: [])").unwrap();
        assert_eq!(song.row_len(), DEFAULT_ROW_LEN);
        assert_eq!(song.byte_len(), 44100 * 4);
    }
}
