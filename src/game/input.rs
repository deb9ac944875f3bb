//! Keyboard state map

use std::collections::HashSet;

use macroquad::prelude::{is_key_down, is_key_released, KeyCode};

/// Keys the game states listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
    Space,
    A,
    W,
    S,
    D,
    Z,
    X,
    F,
    P,
    R,
}

impl Key {
    pub const ALL: [Key; 14] = [
        Key::Left,
        Key::Up,
        Key::Right,
        Key::Down,
        Key::Space,
        Key::A,
        Key::W,
        Key::S,
        Key::D,
        Key::Z,
        Key::X,
        Key::F,
        Key::P,
        Key::R,
    ];

    pub fn keycode(self) -> KeyCode {
        match self {
            Key::Left => KeyCode::Left,
            Key::Up => KeyCode::Up,
            Key::Right => KeyCode::Right,
            Key::Down => KeyCode::Down,
            Key::Space => KeyCode::Space,
            Key::A => KeyCode::A,
            Key::W => KeyCode::W,
            Key::S => KeyCode::S,
            Key::D => KeyCode::D,
            Key::Z => KeyCode::Z,
            Key::X => KeyCode::X,
            Key::F => KeyCode::F,
            Key::P => KeyCode::P,
            Key::R => KeyCode::R,
        }
    }
}

/// Which keys are held, and which were released since the last
/// [`KeyState::update`]
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: HashSet<Key>,
    released: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.released.insert(key);
        self.pressed.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn just_released(&self, key: Key) -> bool {
        self.released.contains(&key)
    }

    /// Forget this frame's releases
    pub fn update(&mut self) {
        self.released.clear();
    }

    /// Sample the macroquad keyboard for every mapped key
    pub fn poll(&mut self) {
        for key in Key::ALL {
            let code = key.keycode();
            if is_key_down(code) {
                self.key_down(key);
            } else if is_key_released(code) || self.is_down(key) {
                self.key_up(key);
            }
        }
    }
}
