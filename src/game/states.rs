//! Built-in menu, game and game over states

use super::{GameState, Key, KeyState, StateId};
use crate::rasterizer::{Framebuffer, HAlign, TextOptions, VAlign, GLYPH_SIZE};

/// Page the game draws its sprite sheet on
pub const SHEET_PAGE: usize = 1;

/// Title glyph scale on a page wide enough for it
const TITLE_SCALE: i32 = 9;

/// Widest letter spacing the title wobble reaches
const TITLE_MAX_SPACING: i32 = 12;

/// Dot colour for column `x`: `x / 8` truncated, negative columns black
fn dot_color(x: i32) -> u8 {
    (x / 8 % 32).max(0) as u8
}

/// Largest scale up to [`TITLE_SCALE`] that keeps `text` on a `width`-wide page
fn fit_scale(text: &str, hspacing: i32, width: usize) -> i32 {
    let n = text.chars().count() as i32;
    (1..=TITLE_SCALE)
        .rev()
        .find(|s| n * (GLYPH_SIZE * s + hspacing) - hspacing <= width as i32)
        .unwrap_or(1)
}

/// Animated field of dots, one every other column, swirling with `t`
pub fn dot_wave(fb: &mut Framebuffer, t: f32) {
    let (hw, hh) = ((fb.width / 2) as i32, (fb.height / 2) as i32);
    let (fw, fh) = (hw as f32, hh as f32);
    let i = t / 3.0;
    for y in -hh..hh {
        for x in (-hw..hw).step_by(2) {
            let (fx, fy) = (x as f32, y as f32);
            let px = fw + fx + fw * ((fy / fh + i) * 4.0).cos() + fy;
            let py = fh + fy + fh * ((fx / fw + i) * 4.0).sin() + fx;
            fb.pset(px.floor() as i32, py.floor() as i32, dot_color(x));
        }
    }
}

/// Large wobbling title, centred horizontally at `y`
fn title(fb: &mut Framebuffer, text: &str, y: f32, t: f32, color: u8) {
    let opts = TextOptions::new(text, (fb.width / 2) as i32, (y + (t * 2.5).sin() * 15.0) as i32, color)
        .align(HAlign::Center, VAlign::Top)
        .spacing((8.0 + (t * 2.9).cos() * 4.0) as i32, (15.0 + (t * 3.5).sin() * 5.0) as i32)
        .scale(fit_scale(text, TITLE_MAX_SPACING, fb.width));
    fb.text(&opts);
}

pub struct MenuState;

impl MenuState {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for MenuState {
    fn step(&mut self, _dt: f32, keys: &KeyState) -> Option<StateId> {
        keys.is_down(Key::P).then_some(StateId::Game)
    }

    fn render(&mut self, fb: &mut Framebuffer, t: f32) {
        fb.set_target(0);
        fb.clear(0);
        dot_wave(fb, t);
        title(fb, "JAMKIT", 40.0, t, 21);
        let prompt = TextOptions::new("PRESS P TO CONTINUE", (fb.width / 2) as i32, fb.height as i32 - 26, 21)
            .align(HAlign::Center, VAlign::Top)
            .spacing(2, 2);
        fb.text(&prompt);
    }
}

/// Showcase of every drawing call, reading sprites from a procedurally
/// drawn sheet
pub struct PlayState {
    sheet_ready: bool,
}

impl PlayState {
    pub fn new() -> Self {
        Self { sheet_ready: false }
    }

    /// Draw the sprite sheet onto [`SHEET_PAGE`]
    pub fn draw_sheet(fb: &mut Framebuffer) {
        let target = fb.target();
        fb.set_target(SHEET_PAGE);
        fb.clear(0);

        // 16x16 ship at (0, 0)
        fb.fill_triangle(8.0, 1.0, 1.0, 14.0, 15.0, 14.0, 12);
        fb.fill_rect(6, 8, 3, 5, 9);
        fb.line(8, 1, 8, 14, 21);

        // 16x16 coin at (16, 0)
        fb.fill_circle(24, 8, 6, 8);
        fb.circle(24, 8, 6, 4);

        // 32x32 checker tile at (0, 16)
        fb.fill_rect(0, 16, 31, 31, 1);
        fb.checker(0, 16, 32, 32, 4, 4, 15);

        // 128x128 badge at (0, 128)
        fb.fill_circle(64, 192, 60, 17);
        fb.fill_circle(64, 192, 44, 26);
        fb.text(&TextOptions::new("JAM", 64, 192, 21).align(HAlign::Center, VAlign::Center).scale(5));

        fb.set_target(target);
    }
}

impl Default for PlayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for PlayState {
    fn step(&mut self, _dt: f32, keys: &KeyState) -> Option<StateId> {
        keys.is_down(Key::X).then_some(StateId::GameOver)
    }

    fn render(&mut self, fb: &mut Framebuffer, t: f32) {
        if !self.sheet_ready {
            Self::draw_sheet(fb);
            self.sheet_ready = true;
        }
        fb.set_target(0);
        fb.set_source(SHEET_PAGE);
        fb.clear(1);
        dot_wave(fb, t);

        fb.fill_rect(0, 0, 16, 16, 17);
        fb.rect(fb.width as i32 - 32, 16, 16, 16, 21);
        fb.fill_circle(32, 32, 8, 21);
        fb.circle(64, 32, 8, 21);
        fb.line(128, 32, 192, 64, 21);
        fb.triangle(0, 0, 16, 16, 32, 32, 21);
        fb.fill_triangle(32.0, 40.0, 64.0, 104.0, 128.0, 168.0, 21);

        fb.spr(0, 0, 16, 16, 16, 200, false, false);
        fb.spr(0, 0, 16, 16, 40, 200, true, false);
        fb.spr(16, 0, 16, 16, 64, 200, false, true);
        fb.sspr(0, 16, 32, 32, 96, 184, 64, 64);

        let angle = (t * 45.0) % 360.0;
        let scale = 0.75 + 0.25 * (t * 1.7).sin();
        fb.rspr(0, 128, 128, 128, fb.width as i32 - 80, 150, scale, angle);

        let banner = TextOptions::new("JAMKIT DEMO", (fb.width / 2) as i32, 4, 21)
            .align(HAlign::Center, VAlign::Top)
            .spacing(2, 2);
        fb.text(&banner);
    }
}

pub struct GameOverState;

impl GameOverState {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GameOverState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for GameOverState {
    fn step(&mut self, _dt: f32, keys: &KeyState) -> Option<StateId> {
        keys.is_down(Key::R).then_some(StateId::Menu)
    }

    fn render(&mut self, fb: &mut Framebuffer, t: f32) {
        fb.set_target(0);
        fb.clear(0);
        title(fb, "GAME OVER", 80.0, t, 27);
    }
}
