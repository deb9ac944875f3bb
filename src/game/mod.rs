//! Game states and the per-frame state machine
//!
//! Fixed set of states, each with its own persistent data. Every frame the
//! current state renders into the framebuffer, then steps; a step may hand
//! over to another state for the next frame.

mod input;
mod states;

pub use input::*;
pub use states::*;

use crate::rasterizer::Framebuffer;

/// Longest frame step, in seconds. Longer gaps (a hidden window, a
/// debugger pause) are clamped to this.
pub const MAX_DT: f32 = 1.0;

/// One screen of the game
pub trait GameState {
    /// Advance by `dt` seconds. Returns the state to switch to, if any.
    fn step(&mut self, dt: f32, keys: &KeyState) -> Option<StateId>;

    /// Draw the state. `t` is the total running time in seconds.
    fn render(&mut self, fb: &mut Framebuffer, t: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Menu = 0,
    Game = 1,
    GameOver = 2,
}

impl StateId {
    pub const ALL: [StateId; 3] = [StateId::Menu, StateId::Game, StateId::GameOver];

    pub fn label(&self) -> &'static str {
        match self {
            StateId::Menu => "menu",
            StateId::Game => "game",
            StateId::GameOver => "gameover",
        }
    }

    pub fn from_index(i: usize) -> Option<StateId> {
        StateId::ALL.get(i).copied()
    }
}

pub struct StateMachine {
    states: [Box<dyn GameState>; 3],
    current: StateId,
    t: f32,
}

impl StateMachine {
    /// The built-in menu, game and game over states, starting at the menu
    pub fn new() -> Self {
        Self::from_states([
            Box::new(MenuState::new()),
            Box::new(PlayState::new()),
            Box::new(GameOverState::new()),
        ])
    }

    /// Custom states, indexed by [`StateId`]
    pub fn from_states(states: [Box<dyn GameState>; 3]) -> Self {
        Self { states, current: StateId::Menu, t: 0.0 }
    }

    pub fn current(&self) -> StateId {
        self.current
    }

    /// Total running time in seconds
    pub fn time(&self) -> f32 {
        self.t
    }

    /// Run one frame: render the current state, then step it
    pub fn frame(&mut self, dt: f32, keys: &KeyState, fb: &mut Framebuffer) {
        let dt = dt.clamp(0.0, MAX_DT);
        self.t += dt;

        let state = &mut self.states[self.current as usize];
        state.render(fb, self.t);
        if let Some(next) = state.step(dt, keys) {
            if next != self.current {
                log::info!("state {} -> {}", self.current.label(), next.label());
                self.current = next;
            }
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
