//! Indexed-color software rasterizer
//!
//! Features:
//! - One byte per pixel, palette index 0-31 (DB32 colors)
//! - Multiple framebuffer pages: draw into a target page, read sprites from a source page
//! - Bresenham lines and circles, edge-function triangle fill with 8x8 blocks
//! - Sprite blits with flips, stretch, and rotation by inverse mapping
//! - 5x5 bitmap font

mod palette;
mod framebuffer;
mod primitives;
mod sprite;
mod text;

pub use palette::*;
pub use framebuffer::*;
pub use text::*;

/// Default screen dimensions
pub const WIDTH: usize = 384;
pub const HEIGHT: usize = 256;

/// Default number of framebuffer pages (one page = WIDTH*HEIGHT bytes)
pub const PAGES: usize = 8;

/// Palette index that sprite reads treat as transparent
pub const TRANSPARENT: u8 = 0;
