//! Biased 16-bit stereo sample buffer

use super::FRAME_BYTES;

/// Word value of silence
pub const BIAS: i32 = 32768;

/// Convert a number the way JavaScript's `ToInt32` does: truncate, then
/// wrap modulo 2^32 into the signed range. NaN and infinities become 0.
#[inline]
pub fn to_int32(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let m = v.trunc().rem_euclid(4294967296.0);
    if m >= 2147483648.0 {
        (m - 4294967296.0) as i32
    } else {
        m as i32
    }
}

/// Map a biased word to a signed sample with 4x gain, clamped to 16 bits
#[inline]
pub fn word_to_i16(word: i32) -> i16 {
    (4 * (word - BIAS)).clamp(-32768, 32767) as i16
}

/// Interleaved stereo samples stored as little-endian 16-bit words offset
/// by [`BIAS`], so bytes `[0, 128]` are silence. Each frame is four bytes:
/// left low, left high, right low, right high.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    bytes: Vec<u8>,
}

impl SampleBuffer {
    /// All-zero bytes. Not silent; run a silence fill over it first.
    pub fn zeroed(frames: usize) -> Self {
        Self { bytes: vec![0; frames * FRAME_BYTES] }
    }

    /// A buffer already filled with silence
    pub fn silent(frames: usize) -> Self {
        let mut bytes = vec![0; frames * FRAME_BYTES];
        for word in bytes.chunks_exact_mut(2) {
            word[1] = 128;
        }
        Self { bytes }
    }

    pub fn frames(&self) -> usize {
        self.bytes.len() / FRAME_BYTES
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(super) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// The 16-bit word starting at byte offset `byte`
    #[inline]
    pub fn word(&self, byte: usize) -> i32 {
        self.bytes[byte] as i32 | (self.bytes[byte + 1] as i32) << 8
    }

    /// Store the low 16 bits of an integer word at byte offset `byte`
    #[inline]
    pub fn set_word(&mut self, byte: usize, x: i32) {
        self.bytes[byte] = (x & 255) as u8;
        self.bytes[byte + 1] = ((x >> 8) & 255) as u8;
    }

    /// Store a fractional word: [`to_int32`] then the low 16 bits
    #[inline]
    pub fn store(&mut self, byte: usize, v: f64) {
        self.set_word(byte, to_int32(v));
    }

    /// Left and right words of `frame`
    #[inline]
    pub fn frame(&self, frame: usize) -> (i32, i32) {
        let b = frame * FRAME_BYTES;
        (self.word(b), self.word(b + 2))
    }

    pub fn frame_i16(&self, frame: usize) -> (i16, i16) {
        let (l, r) = self.frame(frame);
        (word_to_i16(l), word_to_i16(r))
    }

    pub fn is_silent(&self) -> bool {
        self.bytes.chunks_exact(2).all(|w| w[0] == 0 && w[1] == 128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int32_matches_js() {
        assert_eq!(to_int32(1.9), 1);
        assert_eq!(to_int32(-1.9), -1);
        assert_eq!(to_int32(4294967296.0 + 5.0), 5);
        assert_eq!(to_int32(2147483648.0), i32::MIN);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(f64::INFINITY), 0);
    }

    #[test]
    fn test_store_wraps_to_16_bits() {
        let mut buf = SampleBuffer::silent(1);
        buf.store(0, 65536.0 + 300.7);
        assert_eq!(buf.word(0), 300);
        buf.store(2, -1.0);
        assert_eq!(buf.word(2), 0xffff);
        assert_eq!(buf.frame(0), (300, 0xffff));
    }

    #[test]
    fn test_silence_and_conversion() {
        let buf = SampleBuffer::silent(4);
        assert!(buf.is_silent());
        assert_eq!(buf.frames(), 4);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.frame_i16(3), (0, 0));
        assert!(!SampleBuffer::zeroed(1).is_silent());

        assert_eq!(word_to_i16(BIAS + 100), 400);
        assert_eq!(word_to_i16(0), -32768);
        assert_eq!(word_to_i16(0xffff), 32767);
    }
}
