//! Data-driven game balance
//!
//! Every number the simulation consults lives here so tests and settings can
//! override them without touching the constants.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub tile_size: f32,
    pub player_size: f32,
    pub move_speed: f32,
    pub jump_power: f32,
    pub gravity: f32,
    pub friction: f32,
    pub max_jump_time: f32,
    pub max_jump_height: f32,
    pub stomp_tolerance: f32,
    pub stomp_rebound: f32,
    pub respawn_invincibility_ms: f32,
    pub enemy_speed_scale: f32,
    pub starting_lives: u8,
    pub countdown_secs: f32,
    pub death_freeze_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            player_size: PLAYER_SIZE,
            move_speed: PLAYER_SPEED,
            jump_power: JUMP_POWER,
            gravity: GRAVITY,
            friction: FRICTION,
            max_jump_time: MAX_JUMP_TIME,
            max_jump_height: MAX_JUMP_HEIGHT,
            stomp_tolerance: STOMP_TOLERANCE,
            stomp_rebound: STOMP_REBOUND,
            respawn_invincibility_ms: RESPAWN_INVINCIBILITY_MS,
            enemy_speed_scale: 1.0,
            starting_lives: PLAYER_LIVES,
            countdown_secs: COUNTDOWN_SECS,
            death_freeze_secs: DEATH_FREEZE_SECS,
        }
    }
}

impl Tuning {
    /// Defaults adjusted by the persisted settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tile_size: settings.block_size,
            player_size: settings.player_size,
            enemy_speed_scale: settings.difficulty.enemy_speed_scale(),
            ..Self::default()
        }
    }
}
