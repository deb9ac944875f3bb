//! Paged indexed-color framebuffer

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::palette::Palette;
use super::{HEIGHT, PAGES, WIDTH};
use crate::config::DisplayConfig;
use crate::error::Result;

/// Which pixels along the top and left screen edges `pset` may write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundsPolicy {
    /// `0 <= x < width`, `0 <= y < height`
    #[default]
    Inclusive,
    /// `0 < x < width`, `0 < y < height`: row 0 and column 0 are never drawn
    ExcludeOrigin,
}

/// Framebuffer for software rendering.
///
/// One backing array of `width * height * pages` bytes, one palette index
/// per pixel. Draw calls write only the target page; sprite calls read the
/// source page. Page 0 is what gets presented.
pub struct Framebuffer {
    ram: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pages: usize,
    target: usize,
    source: usize,
    pub bounds: BoundsPolicy,
    pub palette: Palette,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, pages: usize) -> Self {
        let pages = pages.max(1);
        Self {
            ram: vec![0; width * height * pages],
            width,
            height,
            pages,
            target: 0,
            source: if pages > 1 { 1 } else { 0 },
            bounds: BoundsPolicy::default(),
            palette: Palette::new(),
        }
    }

    pub fn from_config(config: &DisplayConfig) -> Self {
        let mut fb = Self::new(config.width, config.height, config.pages);
        fb.bounds = config.bounds;
        fb
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.width * self.height
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn source(&self) -> usize {
        self.source
    }

    /// Select the page that draw calls write to
    pub fn set_target(&mut self, page: usize) {
        if page < self.pages {
            self.target = page;
        } else {
            log::warn!("ignoring render target page {} (only {} pages)", page, self.pages);
        }
    }

    /// Select the page that sprite calls read from
    pub fn set_source(&mut self, page: usize) {
        if page < self.pages {
            self.source = page;
        } else {
            log::warn!("ignoring render source page {} (only {} pages)", page, self.pages);
        }
    }

    /// Restore the identity palette remap
    pub fn reset_palette(&mut self) {
        self.palette.reset();
    }

    /// Make stored index `from` appear as `to`
    pub fn remap(&mut self, from: u8, to: u8) {
        self.palette.remap(from, to);
    }

    pub fn page(&self, page: usize) -> &[u8] {
        let size = self.page_size();
        let start = page.min(self.pages - 1) * size;
        &self.ram[start..start + size]
    }

    pub fn page_mut(&mut self, page: usize) -> &mut [u8] {
        let size = self.page_size();
        let start = page.min(self.pages - 1) * size;
        &mut self.ram[start..start + size]
    }

    /// Fill the whole target page with one color
    pub fn clear(&mut self, color: u8) {
        let target = self.target;
        self.page_mut(target).fill(color);
    }

    /// Copy one page over another (explicit page swap)
    pub fn copy_page(&mut self, from: usize, to: usize) {
        if from >= self.pages || to >= self.pages || from == to {
            return;
        }
        let size = self.page_size();
        self.ram.copy_within(from * size..(from + 1) * size, to * size);
    }

    /// Whether `(x, y)` is drawable under the current bounds policy
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        let min = match self.bounds {
            BoundsPolicy::Inclusive => 0,
            BoundsPolicy::ExcludeOrigin => 1,
        };
        x >= min && y >= min && (x as i64) < self.width as i64 && (y as i64) < self.height as i64
    }

    /// Write one pixel on the target page. Outside the screen it does nothing.
    #[inline]
    pub fn pset(&mut self, x: i32, y: i32, color: u8) {
        if self.in_bounds(x, y) {
            let idx = self.target * self.page_size() + y as usize * self.width + x as usize;
            self.ram[idx] = color;
        }
    }

    /// Read one pixel from the target page
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.read(self.target, x, y)
    }

    /// Read one pixel from the source page
    pub fn source_pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.read(self.source, x, y)
    }

    fn read(&self, page: usize, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.ram.get(page * self.page_size() + y as usize * self.width + x as usize).copied()
    }

    /// Raw read of the source page by linear offset. Offsets outside the
    /// page (including negative ones) read as transparent.
    #[inline]
    pub(super) fn source_at(&self, offset: i64) -> u8 {
        if offset < 0 || offset >= self.page_size() as i64 {
            return 0;
        }
        self.ram[self.source * self.page_size() + offset as usize]
    }

    /// Raw write to the target page by linear offset
    #[inline]
    pub(super) fn target_set(&mut self, offset: usize, color: u8) {
        if offset < self.page_size() {
            let idx = self.target * self.page_size() + offset;
            self.ram[idx] = color;
        }
    }

    /// Convert the display page to 0xAABBGGRR words through the palette.
    ///
    /// `out` must hold at least `width * height` words; extra words are left alone.
    pub fn present(&self, out: &mut [u32]) {
        for (dst, &index) in out.iter_mut().zip(self.page(0)) {
            *dst = self.palette.color(index);
        }
    }

    /// Convert the display page to RGBA8 bytes (4 per pixel) for texture upload
    pub fn present_rgba8(&self, out: &mut [u8]) {
        for (dst, &index) in out.chunks_exact_mut(4).zip(self.page(0)) {
            dst.copy_from_slice(&self.palette.color(index).to_le_bytes());
        }
    }

    /// Save the presented display page as a PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut rgba = vec![0u8; self.page_size() * 4];
        self.present_rgba8(&mut rgba);
        image::save_buffer(
            path,
            &rgba,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new(WIDTH, HEIGHT, PAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::COLORS;

    #[test]
    fn test_pset_clips_outside_screen() {
        let mut fb = Framebuffer::new(16, 8, 2);
        let coords = [(-1, 0), (0, -1), (16, 0), (0, 8), (i32::MIN, 3), (3, i32::MAX), (100, 100)];
        for (x, y) in coords {
            fb.pset(x, y, 9);
        }
        assert!(fb.page(0).iter().all(|&p| p == 0));
        assert!(fb.page(1).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_pset_writes_target_only() {
        let mut fb = Framebuffer::new(16, 8, 3);
        fb.set_target(2);
        fb.pset(5, 3, 7);
        assert_eq!(fb.page(2)[3 * 16 + 5], 7);
        assert_eq!(fb.pixel(5, 3), Some(7));
        assert!(fb.page(0).iter().all(|&p| p == 0));
        assert!(fb.page(1).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_bounds_policy_origin() {
        let mut fb = Framebuffer::new(8, 8, 2);
        fb.pset(0, 0, 4);
        assert_eq!(fb.pixel(0, 0), Some(4));

        let mut fb = Framebuffer::new(8, 8, 2);
        fb.bounds = BoundsPolicy::ExcludeOrigin;
        fb.pset(0, 3, 4);
        fb.pset(3, 0, 4);
        fb.pset(1, 1, 4);
        assert_eq!(fb.pixel(0, 3), Some(0));
        assert_eq!(fb.pixel(3, 0), Some(0));
        assert_eq!(fb.pixel(1, 1), Some(4));
    }

    #[test]
    fn test_invalid_page_selection_is_ignored() {
        let mut fb = Framebuffer::new(4, 4, 2);
        fb.set_target(5);
        fb.set_source(9);
        assert_eq!(fb.target(), 0);
        assert_eq!(fb.source(), 1);
    }

    #[test]
    fn test_clear_and_copy_page() {
        let mut fb = Framebuffer::new(4, 4, 3);
        fb.set_target(1);
        fb.clear(12);
        fb.copy_page(1, 2);
        assert!(fb.page(2).iter().all(|&p| p == 12));
        assert!(fb.page(0).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_present_goes_through_palette() {
        let mut fb = Framebuffer::new(2, 1, 2);
        fb.pset(0, 0, 3);
        fb.pset(1, 0, 21);
        fb.remap(3, 5);
        let mut words = [0u32; 2];
        fb.present(&mut words);
        assert_eq!(words, [COLORS[5], COLORS[21]]);

        let mut bytes = [0u8; 8];
        fb.present_rgba8(&mut bytes);
        assert_eq!(&bytes[4..], &[0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_present_ignores_non_display_pages() {
        let mut fb = Framebuffer::new(2, 2, 2);
        fb.set_target(1);
        fb.clear(21);
        let mut words = [0u32; 4];
        fb.present(&mut words);
        assert!(words.iter().all(|&w| w == COLORS[0]));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let mut fb = Framebuffer::new(8, 4, 2);
        fb.clear(21);
        fb.save_png(&path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
