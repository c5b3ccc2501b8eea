//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No I/O; maps arrive already validated
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod enemy;
pub mod physics;
pub mod rect;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::{VerticalHit, WallHit, clamp_to_world, resolve_horizontal, resolve_vertical};
pub use enemy::{Contact, classify_contact, step_enemies};
pub use rect::Rect;
pub use state::{
    Enemy, EnemyKind, Facing, GameEvent, GamePhase, Hud, Item, ItemKind, Player, RunResult,
    SessionRequest, SessionState,
};
pub use tick::{PauseChoice, TickInput, tick};
