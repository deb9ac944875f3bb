//! Sprite blits from the source page to the target page
//!
//! Source pixels equal to [`TRANSPARENT`] are never written.

use super::framebuffer::Framebuffer;
use super::TRANSPARENT;

const DEG_TO_RAD: f64 = 0.0174533;
const SQRT_2: f64 = 1.41421356237;

/// Extra pixels around the rotated bounding square
const ROTATE_MARGIN: i64 = 5;

impl Framebuffer {
    /// Destination write shared by every blit: the full screen is drawable
    /// regardless of the `pset` bounds policy.
    #[inline]
    fn blit(&mut self, x: i64, y: i64, color: u8) {
        if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
            self.target_set(y as usize * self.width + x as usize, color);
        }
    }

    /// Copy an `sw x sh` block from (sx, sy) on the source page to (x, y).
    ///
    /// Mirroring reflects the read index (`sw - j`, `sh - i`), so a flipped
    /// copy starts one column/row past the block edge. The palette remap is
    /// applied when neither or both axes are flipped; single-axis flips copy
    /// the raw index.
    #[allow(clippy::too_many_arguments)]
    pub fn spr(&mut self, sx: i32, sy: i32, sw: i32, sh: i32, x: i32, y: i32, flip_x: bool, flip_y: bool) {
        let width = self.width as i64;
        let (sx, sy, x, y) = (sx as i64, sy as i64, x as i64, y as i64);
        let (sw, sh) = (sw as i64, sh as i64);

        for i in 0..sh {
            for j in 0..sw {
                let row = if flip_y { sy + (sh - i) } else { sy + i };
                let col = if flip_x { sx + (sw - j) } else { sx + j };
                let index = self.source_at(row * width + col);
                if index == TRANSPARENT {
                    continue;
                }
                let color = if flip_x == flip_y { self.palette.get(index) } else { index };
                self.blit(x + j, y + i, color);
            }
        }
    }

    /// Stretch an `sw x sh` source block to `dw x dh` at (x, y), nearest
    /// neighbour, raw indices (no palette remap)
    #[allow(clippy::too_many_arguments)]
    pub fn sspr(&mut self, sx: i32, sy: i32, sw: i32, sh: i32, x: i32, y: i32, dw: i32, dh: i32) {
        if dw <= 0 || dh <= 0 {
            return;
        }
        let width = self.width as i64;
        let x_ratio = sw as f64 / dw as f64;
        let y_ratio = sh as f64 / dh as f64;

        for i in 0..dh as i64 {
            for j in 0..dw as i64 {
                let px = (j as f64 * x_ratio) as i64;
                let py = (i as f64 * y_ratio) as i64;
                let index = self.source_at((sy as i64 + py) * width + sx as i64 + px);
                if index != TRANSPARENT {
                    self.blit(x as i64 + j, y as i64 + i, index);
                }
            }
        }
    }

    /// Rotated and scaled blit centred on (cx, cy).
    ///
    /// Walks a square big enough for any angle and maps each destination
    /// pixel back into the source block (rotate by -angle, scale by
    /// 1/scale), sampling nearest neighbour. `angle` is in degrees. Raw
    /// indices, no palette remap.
    #[allow(clippy::too_many_arguments)]
    pub fn rspr(&mut self, sx: i32, sy: i32, sw: i32, sh: i32, cx: i32, cy: i32, scale: f32, angle: f32) {
        let scale = scale as f64;
        if !(scale > 0.0) || !scale.is_finite() || sw <= 0 || sh <= 0 {
            return;
        }
        let angle = angle as f64 * DEG_TO_RAD;
        let width = self.width as i64;
        let (sx, sy, sw, sh) = (sx as i64, sy as i64, sw as i64, sh as i64);
        let src_cx = sx + sw / 2;
        let src_cy = sy + sh / 2;

        let half_w = ((sw as f64 * scale / 2.0 * SQRT_2) as i64).saturating_add(ROTATE_MARGIN);
        let half_h = ((sh as f64 * scale / 2.0 * SQRT_2) as i64).saturating_add(ROTATE_MARGIN);

        // Only the part of the square that lands on the page
        let (cx, cy) = (cx as i64, cy as i64);
        let (x_start, x_end) = ((-half_w).max(-cx), half_w.min(width - cx));
        let (y_start, y_end) = ((-half_h).max(-cy), half_h.min(self.height as i64 - cy));

        let inv = 1.0 / scale;
        let cos = (-angle).cos() * inv;
        let sin = (-angle).sin() * inv;

        for y in y_start..y_end {
            for x in x_start..x_end {
                let (fx, fy) = (x as f64, y as f64);
                let u = src_cx + (cos * fx + sin * fy + 0.5).floor() as i64;
                let v = src_cy + (-sin * fx + cos * fy + 0.5).floor() as i64;
                if u < sx || v < sy || u >= sx + sw || v >= sy + sh {
                    continue;
                }
                let index = self.source_at(v * width + u);
                if index != TRANSPARENT {
                    self.blit(x + cx, y + cy, index);
                }
            }
        }
    }
}
