//! Susi Mario - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, enemy AI, game state)
//! - `map`: Tile map model and map documents
//! - `grading`: Percentile grading of run times
//! - `records`: Rolling run history
//! - `settings`: Persisted configuration
//! - `persistence`: JSON load/save helpers
//! - `tuning`: Data-driven game balance
//! - `game`: Session controller (fixed timestep, restart, result recording)

pub mod game;
pub mod grading;
pub mod map;
pub mod persistence;
pub mod records;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::{Game, GamePaths, RunOutcome};
pub use grading::{Grade, Tier};
pub use map::MapDefinition;
pub use records::RunHistory;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz baseline)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the controller will simulate in one go (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Velocities are expressed per 60 Hz frame; positions advance by `v * dt * FRAME_RATE`
    pub const FRAME_RATE: f32 = 60.0;

    /// Grid cell size in world units
    pub const TILE_SIZE: f32 = 160.0;
    /// Player edge length (standing)
    pub const PLAYER_SIZE: f32 = 160.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_LIVES: u8 = 3;
    /// Upward velocity held while the jump key is down
    pub const JUMP_POWER: f32 = -15.0;
    pub const GRAVITY: f32 = 0.8;
    /// Horizontal velocity multiplier applied every tick
    pub const FRICTION: f32 = 0.9;
    pub const MAX_JUMP_TIME: f32 = 0.3; // seconds
    pub const MAX_JUMP_HEIGHT: f32 = 400.0;

    /// Stomp window above an enemy's top edge
    pub const STOMP_TOLERANCE: f32 = 20.0;
    pub const STOMP_REBOUND: f32 = -5.0;

    /// Invincibility granted after a respawn (ms)
    pub const RESPAWN_INVINCIBILITY_MS: f32 = 2000.0;
    /// Invincibility granted by the coffee item (ms)
    pub const COFFEE_DURATION_MS: u32 = 6000;

    /// Phase timers (seconds)
    pub const COUNTDOWN_SECS: f32 = 3.0;
    pub const DEATH_FREEZE_SECS: f32 = 1.0;

    /// Default viewport
    pub const SCREEN_WIDTH: u32 = 1920;
    pub const SCREEN_HEIGHT: u32 = 1080;
}

/// Scale factor that turns a per-frame velocity into a displacement for `dt`
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt * consts::FRAME_RATE
}
