//! Game settings and preferences
//!
//! Loaded at startup and saved at shutdown. Missing keys take their defaults;
//! an unreadable file yields `Settings::default()`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::persistence::{self, PersistError};

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Multiplier on enemy patrol speed
    pub fn enemy_speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty name that is none of easy, normal or hard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}` (expected easy, normal or hard)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Volume change per menu step
pub const VOLUME_STEP: f32 = 0.1;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    pub screen_width: u32,
    pub screen_height: u32,
    pub fullscreen: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    // === Gameplay ===
    pub difficulty: Difficulty,
    /// Grid cell size in world units
    pub block_size: f32,
    pub player_size: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            fullscreen: false,
            volume: 0.7,
            difficulty: Difficulty::Normal,
            block_size: TILE_SIZE,
            player_size: PLAYER_SIZE,
        }
    }
}

impl Settings {
    /// Viewport width used by the camera
    pub fn viewport_width(&self) -> f32 {
        self.screen_width as f32
    }

    pub fn volume_up(&mut self) {
        self.volume = (self.volume + VOLUME_STEP).min(1.0);
    }

    pub fn volume_down(&mut self) {
        self.volume = (self.volume - VOLUME_STEP).max(0.0);
    }

    /// Clamp values a hand-edited file may have pushed out of range
    fn sanitize(mut self) -> Self {
        let defaults = Self::default();
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            defaults.volume
        };
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            self.block_size = defaults.block_size;
        }
        if !(self.player_size.is_finite() && self.player_size > 0.0) {
            self.player_size = defaults.player_size;
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            self.screen_width = defaults.screen_width;
            self.screen_height = defaults.screen_height;
        }
        self
    }

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(path: &Path) -> Self {
        match persistence::load_json::<Settings>(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitize()
            }
            Err(e) if e.is_not_found() => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::save_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
