//! Demo-mode input generator
//!
//! Runs right, hops over enemies and walls ahead, and throws in the odd
//! random jump. Seeded, so a given seed always plays the same run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{GamePhase, SessionState};
use super::tick::TickInput;

/// Chance per grounded tick of an unprompted jump
const IDLE_JUMP_CHANCE: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// Ticks left before the current jump is released
    hold_ticks: u32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            hold_ticks: 0,
        }
    }

    pub fn next_input(&mut self, state: &SessionState) -> TickInput {
        let mut input = TickInput::default();
        if state.phase != GamePhase::Playing {
            return input;
        }

        input.move_right = true;

        if self.hold_ticks > 0 {
            self.hold_ticks -= 1;
            input.jump_released = self.hold_ticks == 0;
            return input;
        }

        let player = state.player.rect();
        let reach = state.layout.tile_size * 1.5;
        let ahead = |left: f32| left >= player.right() - 1.0 && left - player.right() < reach;

        let enemy_ahead = state.enemies.iter().any(|e| ahead(e.rect().left()));
        let wall_ahead = state
            .layout
            .colliders
            .solids()
            .filter(|c| c.top() < player.bottom() && c.bottom() > player.top())
            .any(|c| ahead(c.left()));

        if state.player.grounded
            && (enemy_ahead || wall_ahead || self.rng.random_bool(IDLE_JUMP_CHANCE))
        {
            input.jump_pressed = true;
            self.hold_ticks = self.rng.random_range(6..=18);
        }

        input
    }
}
