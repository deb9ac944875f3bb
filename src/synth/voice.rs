//! Per-note synthesis

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::buffer::SampleBuffer;
use super::instrument::{FilterMode, Instrument};
use super::oscillator::{note_freq, sine};
use super::{DEFAULT_ROW_LEN, FRAME_BYTES, SAMPLE_RATE};

/// Renders notes of one instrument into a channel buffer.
///
/// Each note is summed into whatever the buffer already holds, so
/// overlapping notes of a track mix for free. Samples that would land past
/// the end of the buffer are dropped.
#[derive(Debug, Clone)]
pub struct SoundGenerator {
    instr: Instrument,
    row_len: u32,
    pan_freq: f64,
    lfo_freq: f64,
    rng: Pcg32,
}

impl SoundGenerator {
    pub fn new(instr: Instrument, row_len: u32, seed: u64) -> Self {
        let row_len = if row_len == 0 { DEFAULT_ROW_LEN } else { row_len };
        Self {
            pan_freq: 2f64.powi(instr.pan.freq as i32 - 8) / row_len as f64,
            lfo_freq: 2f64.powi(instr.lfo.freq as i32 - 8) / row_len as f64,
            instr,
            row_len,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instr
    }

    pub fn row_len(&self) -> u32 {
        self.row_len
    }

    /// Frames a single-note buffer needs: the note itself plus 32 rows
    /// of room for the delay tail
    pub fn note_frames(&self) -> usize {
        let note = self.instr.env.len() as i64 - 1;
        (note + 32 * self.row_len as i64).max(0) as usize
    }

    /// Add note `n` into `buf` starting at frame `pos`.
    ///
    /// Runs the envelope backwards from its last sample to its first;
    /// oscillator phase and filter state advance in that order.
    pub fn gen_sound(&mut self, n: u8, buf: &mut SampleBuffer, pos: usize) {
        let ins = &self.instr;
        let n = n as f64;
        let osc1_t = note_freq(n + (ins.osc1.octave as f64 - 8.0) * 12.0 + ins.osc1.semitone as f64)
            * (1.0 + 0.0008 * ins.osc1.detune as f64);
        let osc2_t = note_freq(n + (ins.osc2.octave as f64 - 8.0) * 12.0 + ins.osc2.semitone as f64)
            * (1.0 + 0.0008 * ins.osc2.detune as f64);

        let q = ins.filter.resonance as f64 / 255.0;
        let lfo_amt = ins.lfo.amount as f64 / 512.0;
        let pan_amt = ins.pan.amount as f64 / 512.0;
        let master = 39.0 * ins.env.master as f64;
        let noise = ins.noise_fader as f64;

        let (mut c1, mut c2) = (0.0f64, 0.0f64);
        let (mut low, mut band) = (0.0f64, 0.0f64);
        let len = buf.len();

        for j in (0..ins.env.len()).rev() {
            let k = j as usize + pos;
            let kf = k as f64;

            let lfor = ins.lfo.waveform.eval(kf * self.lfo_freq) * lfo_amt + 0.5;
            let e = ins.env.level(j);

            let mut t = osc1_t;
            if ins.lfo.osc1_freq {
                t += lfor;
            }
            if ins.osc1.envelope_pitch {
                t *= e * e;
            }
            c1 += t;
            let mut rsample = ins.osc1.waveform.eval(c1) * ins.osc1.volume as f64;

            let mut t = osc2_t;
            if ins.osc2.envelope_pitch {
                t *= e * e;
            }
            c2 += t;
            rsample += ins.osc2.waveform.eval(c2) * ins.osc2.volume as f64;

            if ins.noise_fader != 0 {
                rsample += (2.0 * self.rng.random::<f64>() - 1.0) * noise * e;
            }
            rsample *= e / 255.0;

            let mut f = ins.filter.freq as f64;
            if ins.lfo.fx_freq {
                f *= lfor;
            }
            f = 1.5 * (f * 3.141592 / SAMPLE_RATE as f64).sin();
            low += f * band;
            let high = q * (rsample - band) - low;
            band += f * high;
            rsample = match ins.filter.mode {
                FilterMode::HighPass => high,
                FilterMode::LowPass => low,
                FilterMode::BandPass => band,
                FilterMode::Notch => low + high,
                FilterMode::None => rsample,
            };

            let pan = sine(kf * self.pan_freq) * pan_amt + 0.5;
            rsample *= master;

            let b = k * FRAME_BYTES;
            if b + 3 < len {
                let left = buf.word(b) as f64 + rsample * (1.0 - pan);
                buf.store(b, left);
                let right = buf.word(b + 2) as f64 + rsample * pan;
                buf.store(b + 2, right);
            }
        }
    }
}
