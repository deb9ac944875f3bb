//! 5x5 bitmap font

use super::framebuffer::Framebuffer;

/// Glyph edge length in font pixels
pub const GLYPH_SIZE: i32 = 5;

/// Characters the font can draw, in glyph order. Anything else is blank.
pub const FONT_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890_!@.'\"?/<()";

/// One row mask per glyph line, most significant of the low five bits is
/// the leftmost pixel
const GLYPHS: [[u8; 5]; 47] = [
    [0b11111, 0b10001, 0b11111, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // B
    [0b11111, 0b10000, 0b10000, 0b10000, 0b01111], // C
    [0b11100, 0b10010, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b11100, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b11100, 0b10000, 0b10000], // F
    [0b11111, 0b10000, 0b10111, 0b10001, 0b11111], // G
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // H
    [0b11111, 0b00100, 0b00100, 0b00100, 0b11111], // I
    [0b11111, 0b00010, 0b00010, 0b10010, 0b11110], // J
    [0b10001, 0b10010, 0b11100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10010, 0b11100, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10010, 0b01111], // Q
    [0b11110, 0b10001, 0b11110, 0b10001, 0b10001], // R
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10101, 0b10101, 0b01110], // W
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // X
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // Z
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00010, 0b00100, 0b11111], // 2
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // 3
    [0b10010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // 5
    [0b01111, 0b10000, 0b11110, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100], // 7
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // 9
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 0
    [0b00000, 0b00000, 0b00000, 0b00000, 0b11111], // _
    [0b00100, 0b00100, 0b00100, 0b00000, 0b00100], // !
    [0b11111, 0b10001, 0b10111, 0b10101, 0b10111], // @
    [0b01010, 0b11111, 0b01010, 0b11111, 0b01010], // .
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00100], // '
    [0b00110, 0b00010, 0b00100, 0b00000, 0b00000], // "
    [0b11011, 0b01001, 0b10010, 0b00000, 0b00000], // ?
    [0b01110, 0b10001, 0b00110, 0b00000, 0b00100], // /
    [0b00001, 0b00010, 0b00100, 0b01000, 0b10000], // <
    [0b00010, 0b00100, 0b01000, 0b00100, 0b00010], // (
    [0b00010, 0b00100, 0b00100, 0b00100, 0b00010], // )
];

/// Glyph rows for a character, `None` for characters outside the font
pub fn glyph(c: char) -> Option<&'static [u8; 5]> {
    FONT_CHARS.chars().position(|f| f == c).map(|i| &GLYPHS[i])
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor: which edge of the text block sits on `y`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Layout parameters for [`Framebuffer::text`]
#[derive(Debug, Clone)]
pub struct TextOptions<'a> {
    pub text: &'a str,
    pub x: i32,
    pub y: i32,
    pub hspacing: i32,
    pub vspacing: i32,
    pub halign: HAlign,
    pub valign: VAlign,
    pub scale: i32,
    pub color: u8,
}

impl<'a> TextOptions<'a> {
    pub fn new(text: &'a str, x: i32, y: i32, color: u8) -> Self {
        Self {
            text,
            x,
            y,
            hspacing: 1,
            vspacing: 1,
            halign: HAlign::Left,
            valign: VAlign::Bottom,
            scale: 1,
            color,
        }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }

    pub fn spacing(mut self, hspacing: i32, vspacing: i32) -> Self {
        self.hspacing = hspacing;
        self.vspacing = vspacing;
        self
    }
}

/// Bounding box of a laid out text block: start, centre and end corners
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextBounds {
    pub sx: f32,
    pub sy: f32,
    pub cx: f32,
    pub cy: f32,
    pub ex: f32,
    pub ey: f32,
    pub width: f32,
    pub height: f32,
}

/// Width of `chars` glyphs laid out in a row
fn span(chars: usize, letter: f32, spacing: f32) -> f32 {
    if chars == 0 {
        return 0.0;
    }
    chars as f32 * letter + (chars - 1) as f32 * spacing
}

impl Framebuffer {
    /// Draw one line of text with its top-left corner at (x, y).
    ///
    /// At scale 1 font pixels are single `pset`s; larger scales draw each
    /// font pixel as `fill_rect(.., scale, scale)`.
    pub fn text_line(&mut self, text: &str, x: i32, y: i32, hspacing: i32, scale: i32, color: u8) {
        let advance = GLYPH_SIZE * scale + hspacing;
        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyph(c) else { continue };
            let left = x + advance * i as i32;
            for (gy, &row) in rows.iter().enumerate() {
                for gx in 0..GLYPH_SIZE {
                    if row & (0b10000 >> gx) == 0 {
                        continue;
                    }
                    let px = left + gx * scale;
                    let py = y + gy as i32 * scale;
                    if scale == 1 {
                        self.pset(px, py, color);
                    } else {
                        self.fill_rect(px, py, scale, scale, color);
                    }
                }
            }
        }
    }

    /// Draw a possibly multi-line string aligned around (x, y) and return
    /// its bounding box. Each line is aligned on its own width.
    pub fn text(&mut self, opts: &TextOptions) -> TextBounds {
        let scale = if opts.scale == 0 { 1 } else { opts.scale };
        let letter = (GLYPH_SIZE * scale) as f32;
        let (hs, vs) = (opts.hspacing as f32, opts.vspacing as f32);
        let (x, y) = (opts.x as f32, opts.y as f32);

        let lines: Vec<&str> = opts.text.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = span(longest, letter, hs);
        let height = span(lines.len(), letter, vs);

        let (sx, ex) = match opts.halign {
            HAlign::Left => (x, x + width),
            HAlign::Center => (x - width / 2.0, x + width / 2.0),
            HAlign::Right => (x - width, x),
        };
        let (sy, ey) = match opts.valign {
            VAlign::Top => (y, y + height),
            VAlign::Center => (y - height / 2.0, y + height / 2.0),
            VAlign::Bottom => (y - height, y),
        };

        for (i, line) in lines.iter().enumerate() {
            let line_width = span(line.chars().count(), letter, hs);
            let lx = match opts.halign {
                HAlign::Left => x,
                HAlign::Center => x - line_width / 2.0,
                HAlign::Right => x - line_width,
            };
            let ly = sy + (letter + vs) * i as f32;
            self.text_line(line, lx.floor() as i32, ly.floor() as i32, opts.hspacing, scale, opts.color);
        }

        TextBounds {
            sx,
            sy,
            cx: sx + width / 2.0,
            cy: sy + height / 2.0,
            ex,
            ey,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &Framebuffer) -> usize {
        fb.page(0).iter().filter(|&&p| p != 0).count()
    }

    #[test]
    fn test_glyph_table_covers_font() {
        assert_eq!(FONT_CHARS.chars().count(), GLYPHS.len());
        assert!(glyph('a').is_none());
        assert!(glyph(' ').is_none());
        assert_eq!(glyph('L'), Some(&[0b10000, 0b10000, 0b10000, 0b10000, 0b11111]));
    }

    #[test]
    fn test_text_line_plots_glyph() {
        let mut fb = Framebuffer::new(32, 16, 2);
        fb.text_line("L", 2, 3, 1, 1, 7);
        assert_eq!(lit(&fb), 9);
        assert_eq!(fb.pixel(2, 3), Some(7));
        assert_eq!(fb.pixel(6, 7), Some(7));
        assert_eq!(fb.pixel(3, 3), Some(0));
    }

    #[test]
    fn test_text_line_advance_and_unknown_chars() {
        let mut fb = Framebuffer::new(32, 16, 2);
        fb.text_line("I I", 0, 0, 1, 1, 7);
        // Space is blank but still advances one cell (5 + 1 pixels)
        assert_eq!(lit(&fb), 26);
        assert_eq!(fb.pixel(12, 0), Some(7));
        assert_eq!(fb.pixel(6, 0), Some(0));
    }

    #[test]
    fn test_text_line_scaled() {
        let mut fb = Framebuffer::new(64, 64, 2);
        fb.text_line("_", 0, 0, 0, 2, 3);
        // Bottom row of five 2x2 cells, each fill_rect covering 3x3 inclusive
        assert_eq!(fb.pixel(0, 8), Some(3));
        assert_eq!(fb.pixel(10, 10), Some(3));
        assert_eq!(fb.pixel(0, 7), Some(0));
        assert_eq!(lit(&fb), 11 * 3);
    }

    #[test]
    fn test_text_bounds_alignment() {
        let mut fb = Framebuffer::new(128, 64, 2);
        let opts = TextOptions::new("AB\nC", 64, 32, 7).align(HAlign::Center, VAlign::Center);
        let b = fb.text(&opts);
        assert_eq!(b.width, 11.0);
        assert_eq!(b.height, 11.0);
        assert_eq!((b.sx, b.ex), (58.5, 69.5));
        assert_eq!((b.sy, b.ey), (26.5, 37.5));
        assert_eq!((b.cx, b.cy), (64.0, 32.0));
    }

    #[test]
    fn test_text_default_anchor_is_bottom_left() {
        let mut fb = Framebuffer::new(64, 32, 2);
        let b = fb.text(&TextOptions::new("I", 4, 20, 9));
        assert_eq!((b.sx, b.sy, b.ex, b.ey), (4.0, 15.0, 9.0, 20.0));
        assert_eq!(fb.pixel(4, 15), Some(9));
        assert_eq!(fb.pixel(4, 20), Some(0));
    }

    #[test]
    fn test_text_right_aligns_each_line() {
        let mut fb = Framebuffer::new(64, 32, 2);
        let opts = TextOptions::new("II\nI", 40, 0, 9).align(HAlign::Right, VAlign::Top);
        fb.text(&opts);
        // Second line is one glyph wide, so it ends at x = 40 too
        assert_eq!(fb.pixel(35, 6), Some(9));
        assert_eq!(fb.pixel(39, 6), Some(9));
        assert_eq!(fb.pixel(29, 6), Some(0));
    }
}
