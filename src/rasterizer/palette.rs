//! Color table and palette remapping

/// Number of logical colors
pub const PALETTE_SIZE: usize = 32;

/// Richard Fhager's DB32 palette.
///
/// Stored as 0xAABBGGRR so that the little-endian bytes of each word are
/// R, G, B, A, ready for upload as RGBA8.
pub const COLORS: [u32; PALETTE_SIZE] = [
    0xff000000, 0xff342022, 0xff3c2845, 0xff313966, 0xff3b568f, 0xff2671df, 0xff66a0d9, 0xff9ac3ee,
    0xff36f2fb, 0xff50e599, 0xff30be6a, 0xff6e9437, 0xff2f694b, 0xff244b52, 0xff393c32, 0xff743f3f,
    0xff826030, 0xffe16e5b, 0xffff9b63, 0xffe4cd5f, 0xfffcdbcb, 0xffffffff, 0xffb7ad9b, 0xff877e84,
    0xff6a6a69, 0xff525659, 0xff8a4276, 0xff3232ac, 0xff6357d9, 0xffba7bd7, 0xff4a978f, 0xff306f8a,
];

/// Remap table from a stored palette index to a displayed palette index.
///
/// Starts as the identity. Swapping entries between frames gives palette
/// effects (flashes, fades, team colors) without touching pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    map: [u8; PALETTE_SIZE],
}

impl Palette {
    pub const IDENTITY: Palette = Palette { map: identity_map() };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    /// Restore the identity mapping
    pub fn reset(&mut self) {
        self.map = identity_map();
    }

    /// Make stored index `from` display as `to`
    pub fn remap(&mut self, from: u8, to: u8) {
        if let Some(slot) = self.map.get_mut(from as usize) {
            *slot = to;
        }
    }

    /// Look up the remapped index. Indices outside the table map to 0.
    #[inline]
    pub fn get(&self, index: u8) -> u8 {
        self.map.get(index as usize).copied().unwrap_or(0)
    }

    /// Final display color for a stored index, or 0 (fully transparent
    /// black) when the index falls outside the color table
    #[inline]
    pub fn color(&self, index: u8) -> u32 {
        COLORS.get(self.get(index) as usize).copied().unwrap_or(0)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

const fn identity_map() -> [u8; PALETTE_SIZE] {
    let mut map = [0u8; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        map[i] = i as u8;
        i += 1;
    }
    map
}
