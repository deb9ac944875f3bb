//! Lines, circles, rectangles and triangles

use super::framebuffer::Framebuffer;

/// Triangle fill block size (must be a power of two)
const BLOCK: i64 = 8;

/// Largest vertex coordinate `fill_triangle` accepts; beyond it vertices
/// are clamped so the fixed-point edge products stay inside `i64`
const VERTEX_LIMIT: f32 = (1 << 24) as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    Outside,
    Covers,
    Partial,
}

/// JavaScript-style `Math.round` (halves round up, also for negatives)
#[inline]
fn round_half_up(v: f32) -> i64 {
    (v as f64 + 0.5).floor() as i64
}

impl Framebuffer {
    /// Draw a line from (x1, y1) to (x2, y2) using Bresenham's algorithm.
    ///
    /// Both endpoints are always plotted; a zero-length line plots one pixel.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u8) {
        let (mut x1, mut y1) = (x1 as i64, y1 as i64);
        let (x2, y2) = (x2 as i64, y2 as i64);

        let mut dy = y2 - y1;
        let mut dx = x2 - x1;
        let step_y = if dy < 0 { dy = -dy; -1 } else { 1 };
        let step_x = if dx < 0 { dx = -dx; -1 } else { 1 };
        dy <<= 1;
        dx <<= 1;

        self.pset(x1 as i32, y1 as i32, color);
        if dx > dy {
            let mut fraction = dy - (dx >> 1);
            while x1 != x2 {
                if fraction >= 0 {
                    y1 += step_y;
                    fraction -= dx;
                }
                x1 += step_x;
                fraction += dy;
                self.pset(x1 as i32, y1 as i32, color);
            }
        } else {
            let mut fraction = dx - (dy >> 1);
            while y1 != y2 {
                if fraction >= 0 {
                    x1 += step_x;
                    fraction -= dy;
                }
                y1 += step_y;
                fraction += dx;
                self.pset(x1 as i32, y1 as i32, color);
            }
        }
    }

    /// Circle outline, midpoint algorithm plotting the four symmetric points per step
    pub fn circle(&mut self, xm: i32, ym: i32, r: i32, color: u8) {
        let (xm, ym, r) = (xm as i64, ym as i64, r as i64);
        if self.circle_coverage(xm, ym, r) != Coverage::Partial {
            return;
        }
        let (mut x, mut y, mut err) = (-r, 0, 2 - 2 * r);
        loop {
            self.pset_wide(xm - x, ym + y, color);
            self.pset_wide(xm - y, ym - x, color);
            self.pset_wide(xm + x, ym - y, color);
            self.pset_wide(xm + y, ym + x, color);
            let r = err;
            if r <= y {
                y += 1;
                err += y * 2 + 1;
            }
            if r > x || err > y {
                x += 1;
                err += x * 2 + 1;
            }
            if x >= 0 {
                break;
            }
        }
    }

    /// Filled circle: same walk as `circle`, one horizontal span per symmetric pair
    pub fn fill_circle(&mut self, xm: i32, ym: i32, r: i32, color: u8) {
        if r < 0 {
            return;
        }
        let (xm, ym, r) = (xm as i64, ym as i64, r as i64);
        match self.circle_coverage(xm, ym, r) {
            Coverage::Outside => return,
            Coverage::Covers => {
                for y in 0..self.height as i64 {
                    self.hspan(0, self.width as i64 - 1, y, color);
                }
                return;
            }
            Coverage::Partial => {}
        }
        let (mut x, mut y, mut err) = (-r, 0, 2 - 2 * r);
        loop {
            self.hspan(xm - x, xm + x, ym - y, color);
            self.hspan(xm - x, xm + x, ym + y, color);
            let r = err;
            if r <= y {
                y += 1;
                err += y * 2 + 1;
            }
            if r > x || err > y {
                x += 1;
                err += x * 2 + 1;
            }
            if x >= 0 {
                break;
            }
        }
    }

    /// Where the ring of radius `r` around (xm, ym) falls relative to the
    /// page. Ring pixels lie within one pixel of the radius.
    fn circle_coverage(&self, xm: i64, ym: i64, r: i64) -> Coverage {
        let (w, h) = (self.width as i64, self.height as i64);
        let reach = r.abs() + 1;
        if xm + reach < 0 || ym + reach < 0 || xm - reach >= w || ym - reach >= h {
            return Coverage::Outside;
        }
        let far_x = xm.abs().max((w - 1 - xm).abs()) as i128;
        let far_y = ym.abs().max((h - 1 - ym).abs()) as i128;
        let inner = r as i128 - 2;
        if inner > 0 && far_x * far_x + far_y * far_y < inner * inner {
            Coverage::Covers
        } else {
            Coverage::Partial
        }
    }

    #[inline]
    fn pset_wide(&mut self, x: i64, y: i64, color: u8) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.pset(x, y, color);
        }
    }

    /// Horizontal run from x1 to x2 on row y, clipped to one pixel past
    /// either page edge
    fn hspan(&mut self, x1: i64, x2: i64, y: i64, color: u8) {
        if y < 0 || y >= self.height as i64 {
            return;
        }
        let w = self.width as i64;
        let (x1, x2) = (x1.clamp(-1, w), x2.clamp(-1, w));
        self.line(x1 as i32, y as i32, x2 as i32, y as i32, color);
    }

    /// Rectangle outline from (x, y) to (x + w, y + h), both corners inclusive
    pub fn rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8) {
        let (x2, y2) = (x + w, y + h);
        self.line(x, y, x2, y, color);
        self.line(x2, y, x2, y2, color);
        self.line(x, y2, x2, y2, color);
        self.line(x, y, x, y2, color);
    }

    /// Filled rectangle from (x, y) to (x + w, y + h), both corners inclusive
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u8) {
        self.fill_span(x, y, x + w, y + h, color);
    }

    /// Top and bottom lines, then every row strictly between them
    pub(super) fn fill_span(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u8) {
        let rows = (y2 - y1).abs();
        self.line(x1, y1, x2, y1, color);
        for i in (1..rows).rev() {
            self.line(x1, y1 + i, x2, y1 + i, color);
        }
        self.line(x1, y2, x2, y2, color);
    }

    /// Triangle outline: three lines through the vertices in order
    pub fn triangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32, color: u8) {
        self.line(x1, y1, x2, y2, color);
        self.line(x2, y2, x3, y3, color);
        self.line(x3, y3, x1, y1, color);
    }

    /// Filled triangle using half-space edge functions.
    ///
    /// Vertices are snapped to 28.4 fixed point. The screen is walked in 8x8
    /// blocks: blocks fully outside one edge are skipped, blocks fully inside
    /// all three are filled whole, the rest are tested per pixel. Top-left
    /// fill convention, so triangles sharing an edge never both cover a pixel.
    /// Vertices must be counter-clockwise on screen (y down); the opposite
    /// winding covers nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, color: u8) {
        if ![x1, y1, x2, y2, x3, y3].iter().all(|v| v.is_finite()) {
            return;
        }
        let snap = |v: f32| round_half_up(16.0 * v.clamp(-VERTEX_LIMIT, VERTEX_LIMIT));
        let (x1, x2, x3) = (snap(x1), snap(x2), snap(x3));
        let (y1, y2, y3) = (snap(y1), snap(y2), snap(y3));

        let (dx12, dy12) = (x1 - x2, y2 - y1);
        let (dx23, dy23) = (x2 - x3, y3 - y2);
        let (dx31, dy31) = (x3 - x1, y1 - y3);

        let width = self.width as i64;
        let height = self.height as i64;
        let mut min_x = ((x1.min(x2).min(x3) + 0xf) >> 4).max(0);
        let max_x = ((x1.max(x2).max(x3) + 0xf) >> 4).min(width);
        let mut min_y = ((y1.min(y2).min(y3) + 0xf) >> 4).max(0);
        let max_y = ((y1.max(y2).max(y3) + 0xf) >> 4).min(height);

        // Start in the corner of a block
        min_x &= !(BLOCK - 1);
        min_y &= !(BLOCK - 1);

        let mut c1 = -dy12 * x1 - dx12 * y1;
        let mut c2 = -dy23 * x2 - dx23 * y2;
        let mut c3 = -dy31 * x3 - dx31 * y3;

        // Fill convention
        if dy12 > 0 || (dy12 == 0 && dx12 > 0) {
            c1 += 1;
        }
        if dy23 > 0 || (dy23 == 0 && dx23 > 0) {
            c2 += 1;
        }
        if dy31 > 0 || (dy31 == 0 && dx31 > 0) {
            c3 += 1;
        }

        // Back to pixel units. Sub-pixel precision survives because the
        // coverage test is >= 0.
        let c1 = (c1 - 1) >> 4;
        let c2 = (c2 - 1) >> 4;
        let c3 = (c3 - 1) >> 4;

        let (min1, max1) = block_corners(dx12, dy12);
        let (min2, max2) = block_corners(dx23, dy23);
        let (min3, max3) = block_corners(dx31, dy31);

        let mut y0 = min_y;
        while y0 < max_y {
            let mut x0 = min_x;
            while x0 < max_x {
                // Edge functions at the block's top-left corner
                let mut cy1 = c1 + dx12 * y0 + dy12 * x0;
                let mut cy2 = c2 + dx23 * y0 + dy23 * x0;
                let mut cy3 = c3 + dx31 * y0 + dy31 * x0;

                if cy1 < max1 || cy2 < max2 || cy3 < max3 {
                    x0 += BLOCK;
                    continue;
                }

                if cy1 >= min1 && cy2 >= min2 && cy3 >= min3 {
                    for iy in 0..BLOCK {
                        for ix in 0..BLOCK {
                            self.block_pixel(x0 + ix, y0 + iy, color);
                        }
                    }
                } else {
                    for iy in 0..BLOCK {
                        let (mut cx1, mut cx2, mut cx3) = (cy1, cy2, cy3);
                        for ix in 0..BLOCK {
                            if (cx1 | cx2 | cx3) >= 0 {
                                self.block_pixel(x0 + ix, y0 + iy, color);
                            }
                            cx1 += dy12;
                            cx2 += dy23;
                            cx3 += dy31;
                        }
                        cy1 += dx12;
                        cy2 += dx23;
                        cy3 += dx31;
                    }
                }
                x0 += BLOCK;
            }
            y0 += BLOCK;
        }
    }

    #[inline]
    fn block_pixel(&mut self, x: i64, y: i64, color: u8) {
        if x < self.width as i64 && y < self.height as i64 {
            self.target_set(y as usize * self.width + x as usize, color);
        }
    }

    /// Checkerboard of `rows x cols` filled blocks inside (x, y, w, h).
    /// Zero rows or columns default to 8.
    #[allow(clippy::too_many_arguments)]
    pub fn checker(&mut self, x: i32, y: i32, w: i32, h: i32, rows: u32, cols: u32, color: u8) {
        let rows = if rows == 0 { 8 } else { rows };
        let cols = if cols == 0 { 8 } else { cols };
        let bw = w as f32 / cols as f32;
        let bh = h as f32 / rows as f32;

        for i in 0..rows {
            let mut j = 0;
            while (j as f32) < cols as f32 / 2.0 {
                let offset = if i % 2 == 1 { 0.0 } else { bw };
                let bx = x as f32 + 2.0 * j as f32 * bw + offset;
                let by = y as f32 + i as f32 * bh;
                self.fill_span(
                    bx as i32,
                    by as i32,
                    (bx + bw - 1.0) as i32,
                    (by + bh - 1.0) as i32,
                    color,
                );
                j += 1;
            }
        }
    }
}

/// Edge offsets to the block corner with the smallest and largest value
fn block_corners(dx: i64, dy: i64) -> (i64, i64) {
    let qm1 = BLOCK - 1;
    let (mut n_min, mut n_max) = (0, 0);
    if dx >= 0 {
        n_max -= qm1 * dx;
    } else {
        n_min -= qm1 * dx;
    }
    if dy >= 0 {
        n_max -= qm1 * dy;
    } else {
        n_min -= qm1 * dy;
    }
    (n_min, n_max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb() -> Framebuffer {
        Framebuffer::new(384, 256, 2)
    }

    fn count(fb: &Framebuffer, color: u8) -> usize {
        fb.page(fb.target()).iter().filter(|&&p| p == color).count()
    }

    /// Per-pixel evaluation of the same fixed-point edge functions, no blocks
    fn reference_triangle(fb: &Framebuffer, v: [f32; 6]) -> Vec<bool> {
        let x1 = round_half_up(16.0 * v[0]);
        let y1 = round_half_up(16.0 * v[1]);
        let x2 = round_half_up(16.0 * v[2]);
        let y2 = round_half_up(16.0 * v[3]);
        let x3 = round_half_up(16.0 * v[4]);
        let y3 = round_half_up(16.0 * v[5]);
        let (dx12, dy12) = (x1 - x2, y2 - y1);
        let (dx23, dy23) = (x2 - x3, y3 - y2);
        let (dx31, dy31) = (x3 - x1, y1 - y3);
        let bias = |dx: i64, dy: i64| if dy > 0 || (dy == 0 && dx > 0) { 1 } else { 0 };
        let c1 = (-dy12 * x1 - dx12 * y1 + bias(dx12, dy12) - 1) >> 4;
        let c2 = (-dy23 * x2 - dx23 * y2 + bias(dx23, dy23) - 1) >> 4;
        let c3 = (-dy31 * x3 - dx31 * y3 + bias(dx31, dy31) - 1) >> 4;

        let mut covered = vec![false; fb.width * fb.height];
        for y in 0..fb.height as i64 {
            for x in 0..fb.width as i64 {
                let e1 = c1 + dx12 * y + dy12 * x;
                let e2 = c2 + dx23 * y + dy23 * x;
                let e3 = c3 + dx31 * y + dy31 * x;
                covered[y as usize * fb.width + x as usize] = e1 >= 0 && e2 >= 0 && e3 >= 0;
            }
        }
        covered
    }

    fn assert_matches_reference(v: [f32; 6]) -> usize {
        let mut fb = fb();
        fb.fill_triangle(v[0], v[1], v[2], v[3], v[4], v[5], 9);
        let expected = reference_triangle(&fb, v);
        for (i, (&px, &want)) in fb.page(0).iter().zip(&expected).enumerate() {
            assert_eq!(px == 9, want, "pixel ({}, {}) for {:?}", i % fb.width, i / fb.width, v);
        }
        expected.iter().filter(|&&c| c).count()
    }

    #[test]
    fn test_line_single_point() {
        let mut fb = fb();
        fb.line(10, 12, 10, 12, 5);
        assert_eq!(count(&fb, 5), 1);
        assert_eq!(fb.pixel(10, 12), Some(5));
    }

    #[test]
    fn test_line_plots_both_endpoints() {
        let mut fb = fb();
        for &(x1, y1, x2, y2) in &[(0, 0, 37, 11), (50, 40, 3, 90), (20, 20, 21, 60), (100, 5, 60, 5)] {
            fb.clear(0);
            fb.line(x1, y1, x2, y2, 7);
            assert_eq!(fb.pixel(x1, y1), Some(7));
            assert_eq!(fb.pixel(x2, y2), Some(7));
            let major = (x2 - x1).abs().max((y2 - y1).abs()) as usize;
            assert_eq!(count(&fb, 7), major + 1);
        }
    }

    #[test]
    fn test_line_partially_offscreen() {
        let mut fb = fb();
        fb.line(-10, 3, 5, 3, 2);
        assert_eq!(count(&fb, 2), 6);
    }

    #[test]
    fn test_circle_radius_zero_is_center() {
        let mut fb = fb();
        fb.circle(40, 40, 0, 3);
        assert_eq!(count(&fb, 3), 1);
        assert_eq!(fb.pixel(40, 40), Some(3));
    }

    #[test]
    fn test_circle_is_symmetric() {
        let mut fb = fb();
        let (cx, cy) = (100, 100);
        fb.circle(cx, cy, 9, 4);
        assert_eq!(fb.pixel(cx + 9, cy), Some(4));
        assert_eq!(fb.pixel(cx, cy - 9), Some(4));
        assert_eq!(fb.pixel(cx, cy), Some(0));
        for dy in -9..=9 {
            for dx in -9..=9 {
                let p = fb.pixel(cx + dx, cy + dy);
                assert_eq!(p, fb.pixel(cx - dx, cy + dy));
                assert_eq!(p, fb.pixel(cx + dx, cy - dy));
                assert_eq!(p, fb.pixel(cx + dy, cy + dx));
            }
        }
    }

    #[test]
    fn test_fill_circle_covers_outline() {
        let mut outline = fb();
        outline.circle(60, 60, 12, 1);
        let mut filled = fb();
        filled.fill_circle(60, 60, 12, 1);
        for (o, f) in outline.page(0).iter().zip(filled.page(0)) {
            if *o == 1 {
                assert_eq!(*f, 1);
            }
        }
        assert_eq!(filled.pixel(60, 60), Some(1));
        assert!(count(&filled, 1) > count(&outline, 1));
    }

    #[test]
    fn test_fill_circle_negative_radius() {
        let mut fb = fb();
        fb.fill_circle(60, 60, -3, 1);
        assert_eq!(count(&fb, 1), 0);
    }

    #[test]
    fn test_rect_outline() {
        let mut fb = fb();
        fb.rect(10, 10, 4, 3, 6);
        // 5x4 inclusive box: perimeter pixels only
        assert_eq!(count(&fb, 6), 14);
        assert_eq!(fb.pixel(12, 11), Some(0));
        assert_eq!(fb.pixel(14, 13), Some(6));
    }

    #[test]
    fn test_fill_rect_inclusive() {
        let mut fb = fb();
        fb.fill_rect(0, 0, 16, 16, 17);
        assert_eq!(count(&fb, 17), 17 * 17);

        fb.clear(0);
        fb.fill_rect(5, 5, 3, 0, 17);
        assert_eq!(count(&fb, 17), 4);
    }

    #[test]
    fn test_triangle_outline_touches_vertices() {
        let mut fb = fb();
        fb.triangle(0, 0, 16, 16, 32, 0, 8);
        for (x, y) in [(0, 0), (16, 16), (32, 0)] {
            assert_eq!(fb.pixel(x, y), Some(8));
        }
        assert_eq!(fb.pixel(16, 5), Some(0));
    }

    #[test]
    fn test_fill_triangle_right_angle() {
        // Legs of 8 pixels: the hypotenuse belongs to the neighbour, 8+7+...+1 remain
        assert_eq!(assert_matches_reference([0.0, 0.0, 0.0, 8.0, 8.0, 0.0]), 36);
        assert_eq!(assert_matches_reference([0.0, 0.0, 0.0, 4.0, 4.0, 0.0]), 10);
        assert_eq!(assert_matches_reference([0.0, 0.0, 0.0, 16.0, 16.0, 0.0]), 136);
    }

    #[test]
    fn test_fill_triangle_acute_and_obtuse() {
        assert_eq!(assert_matches_reference([10.0, 10.0, 30.0, 50.0, 60.0, 20.0]), 890);
        assert_eq!(assert_matches_reference([5.0, 5.0, 20.0, 12.0, 100.0, 10.0]), 292);
        assert_eq!(assert_matches_reference([32.0, 0.0, 64.0, 64.0, 128.0, 128.0]), 1056);
    }

    #[test]
    fn test_fill_triangle_subpixel() {
        assert_eq!(assert_matches_reference([2.5, 1.25, 3.0, 30.0, 40.0, 7.5]), 541);
    }

    #[test]
    fn test_fill_triangle_degenerate_and_reversed() {
        assert_eq!(assert_matches_reference([0.0, 0.0, 10.0, 10.0, 20.0, 20.0]), 0);
        // Clockwise winding covers nothing
        assert_eq!(assert_matches_reference([0.0, 0.0, 8.0, 0.0, 0.0, 8.0]), 0);
    }

    #[test]
    fn test_fill_triangle_shared_edge() {
        let mut fb = fb();
        fb.fill_triangle(0.0, 0.0, 0.0, 16.0, 16.0, 16.0, 1);
        let first: Vec<bool> = fb.page(0).iter().map(|&p| p == 1).collect();
        fb.clear(0);
        fb.fill_triangle(0.0, 0.0, 16.0, 16.0, 16.0, 0.0, 2);
        let second: Vec<bool> = fb.page(0).iter().map(|&p| p == 2).collect();

        let overlap = first.iter().zip(&second).filter(|(a, b)| **a && **b).count();
        let union = first.iter().zip(&second).filter(|(a, b)| **a || **b).count();
        assert_eq!(overlap, 0);
        assert_eq!(union, 256);
    }

    #[test]
    fn test_fill_triangle_clips_to_screen() {
        let mut fb = Framebuffer::new(20, 12, 2);
        fb.fill_triangle(-50.0, -50.0, -50.0, 100.0, 100.0, -50.0, 3);
        assert!(fb.page(0).iter().all(|&p| p == 3));
        assert!(fb.page(1).iter().all(|&p| p == 0));
    }

    #[test]
    fn test_checker_alternates() {
        let mut fb = fb();
        fb.checker(0, 0, 64, 64, 8, 8, 2);
        // Row 0 starts with a gap, row 1 starts with a block
        assert_eq!(fb.pixel(0, 0), Some(0));
        assert_eq!(fb.pixel(8, 0), Some(2));
        assert_eq!(fb.pixel(0, 8), Some(2));
        assert_eq!(fb.pixel(8, 8), Some(0));
        // 32 blocks, each spanning 8x8 inclusive pixels
        assert_eq!(count(&fb, 2), 32 * 64);
    }

    #[test]
    fn test_huge_circles_stay_silent() {
        let mut fb = fb();
        fb.circle(0, 0, i32::MAX, 9);
        fb.circle(i32::MAX, i32::MIN, 5, 9);
        fb.fill_circle(0, 0, i32::MAX, 3);
        assert_eq!(count(&fb, 9), 0);
        assert_eq!(count(&fb, 3), fb.width * fb.height);

        fb.fill_circle(i32::MAX, i32::MAX, 10, 4);
        assert_eq!(count(&fb, 4), 0);
    }

    #[test]
    fn test_fill_circle_covering_page_matches_walk() {
        // Radius 240 around the page centre reaches past every corner
        let mut small = fb();
        small.fill_circle(192, 128, 240, 5);
        assert_eq!(count(&small, 5), small.width * small.height);

        let mut big = Framebuffer::new(1024, 1024, 1);
        big.fill_circle(512, 512, 240, 5);
        for y in 384..640 {
            for x in 320..704 {
                assert_eq!(big.pixel(x, y), Some(5), "({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_fill_triangle_extreme_vertices() {
        let mut fb = fb();
        fb.fill_triangle(f32::NAN, 0.0, 10.0, 10.0, 0.0, 10.0, 9);
        fb.fill_triangle(f32::INFINITY, 0.0, -10.0, 10.0, 0.0, 10.0, 9);
        assert_eq!(count(&fb, 9), 0);

        fb.fill_triangle(1e20, 0.0, -1e20, 10.0, 0.0, 10.0, 9);
        assert_eq!(fb.pixel(10, 6), Some(9));
        assert_eq!(fb.pixel(10, 20), Some(0));
    }
}
