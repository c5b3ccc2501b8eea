//! Session state and core simulation types
//!
//! Everything one run needs lives in `SessionState`, which is plain data and
//! serializable so a run can be snapshotted and compared tick for tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::map::{EnemySpawn, ItemSpawn, LevelLayout, MapDefinition};
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-play countdown; simulation frozen
    Countdown,
    /// Active gameplay
    Playing,
    /// Frozen until resumed
    Paused,
    /// Death freeze before respawn or game over
    Dying,
    /// Goal reached or boss defeated (terminal)
    Victory,
    /// Out of lives (terminal)
    GameOver,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::GameOver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// Current size; height halves while crouching
    pub size: Vec2,
    pub standing_height: f32,
    pub grounded: bool,
    pub crouching: bool,
    pub jumping: bool,
    pub jump_held: bool,
    /// Seconds since the current jump started
    pub jump_time: f32,
    pub jump_start_y: f32,
    /// Highest point (lowest y) the current jump may reach
    pub jump_apex: Option<f32>,
    pub lives: u8,
    /// Remaining invincibility; invincible while positive
    pub invincible_ms: f32,
    pub facing: Facing,
}

impl Player {
    pub fn new(spawn: Vec2, size: f32, lives: u8) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            size: Vec2::splat(size),
            standing_height: size,
            grounded: false,
            crouching: false,
            jumping: false,
            jump_held: false,
            jump_time: 0.0,
            jump_start_y: spawn.y,
            jump_apex: None,
            lives,
            invincible_ms: 0.0,
            facing: Facing::Right,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0
    }

    /// Put the player back at `spawn`, standing still, keeping lives
    pub fn respawn(&mut self, spawn: Vec2, invincible_ms: f32) {
        let lives = self.lives;
        *self = Self::new(spawn, self.size.x, lives);
        self.invincible_ms = invincible_ms;
    }
}

/// Per-kind enemy statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    /// Patrol half-distance in tiles
    pub patrol_tiles: f32,
    /// Edge length in tiles
    pub size_tiles: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Weak,
    Strong,
    Boss,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::Weak => EnemyStats {
                speed: 1.0,
                health: 1,
                damage: 1,
                patrol_tiles: 2.0,
                size_tiles: 1.0,
            },
            EnemyKind::Strong => EnemyStats {
                speed: 2.0,
                health: 2,
                damage: 2,
                patrol_tiles: 3.0,
                size_tiles: 1.0,
            },
            EnemyKind::Boss => EnemyStats {
                speed: 1.0,
                health: 10,
                damage: 3,
                patrol_tiles: 5.0,
                size_tiles: 2.0,
            },
        }
    }
}

/// A patrolling enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub damage: i32,
    /// Patrol half-distance in world units
    pub patrol: f32,
    pub origin_x: f32,
    pub facing: Facing,
}

impl Enemy {
    /// Spawn from a layout descriptor; bodies larger than one tile grow up
    /// and right from the spawn cell so they stand on the same floor.
    pub fn spawn(id: u32, spawn: &EnemySpawn, tile_size: f32, speed_scale: f32) -> Self {
        let stats = spawn.kind.stats();
        let edge = stats.size_tiles * tile_size;
        let pos = Vec2::new(spawn.pos.x, spawn.pos.y + tile_size - edge);
        Self {
            id,
            kind: spawn.kind,
            pos,
            vel: Vec2::new(-stats.speed * speed_scale, 0.0),
            size: Vec2::splat(edge),
            health: stats.health,
            damage: stats.damage,
            patrol: stats.patrol_tiles * tile_size,
            origin_x: pos.x,
            facing: Facing::Left,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size)
    }

    pub fn reverse(&mut self) {
        self.vel.x = -self.vel.x;
        self.facing = self.facing.flipped();
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Temporary invulnerability to enemy contact
    Invincibility { duration_ms: u32 },
    /// Counts toward the collected tally only
    Generic,
}

/// A power item; collected items stay in storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub rect: Rect,
    pub collected: bool,
}

impl Item {
    pub fn spawn(id: u32, spawn: &ItemSpawn, tile_size: f32) -> Self {
        Self {
            id,
            kind: spawn.kind,
            rect: Rect::new(spawn.pos.x, spawn.pos.y, tile_size, tile_size),
            collected: false,
        }
    }
}

/// Game events for presentation (audio, effects) consumption
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CountdownFinished,
    Jumped,
    Stomped { enemy_id: u32 },
    EnemyDefeated { enemy_id: u32, kind: EnemyKind },
    ItemCollected { item_id: u32, kind: ItemKind },
    PlayerHit { enemy_id: u32 },
    PlayerFell,
    Respawned { lives: u8 },
    ShortcutTaken,
    CameraLocked,
    BossDefeated,
    Paused,
    Resumed,
    Victory,
    GameOver,
}

/// Summary produced on entering a terminal phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub victory: bool,
    /// Seconds spent in Playing
    pub elapsed: f32,
    pub lives: u8,
}

/// Requests the session raises for its owner to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionRequest {
    Restart,
    ExitToMenu,
}

/// Read-only snapshot for a heads-up display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub phase: GamePhase,
    pub lives: u8,
    pub elapsed: f32,
    pub camera_x: f32,
    pub invincible: bool,
    /// Whole seconds left in the countdown (0 outside Countdown)
    pub countdown: u32,
}

/// Complete state of one run (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub tuning: Tuning,
    pub viewport_width: f32,
    pub layout: LevelLayout,
    pub player: Player,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// Items (sorted by id)
    pub items: Vec<Item>,
    pub phase: GamePhase,
    /// Seconds left in Countdown
    pub countdown: f32,
    /// Seconds left in Dying
    pub death_timer: f32,
    /// Seconds spent in Playing
    pub elapsed: f32,
    pub camera_x: f32,
    pub camera_locked: bool,
    pub items_collected: u32,
    /// Alternate map entered through a pipe (consumed once)
    pub shortcut: Option<MapDefinition>,
    pub result: Option<RunResult>,
    pub request: Option<SessionRequest>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SessionState {
    pub fn new(map: &MapDefinition, tuning: Tuning, viewport_width: f32) -> Self {
        let layout = LevelLayout::build(map, tuning.tile_size);
        let player = Player::new(
            player_spawn_pos(&layout, tuning.player_size),
            tuning.player_size,
            tuning.starting_lives,
        );

        let mut state = Self {
            countdown: tuning.countdown_secs,
            tuning,
            viewport_width,
            layout,
            player,
            enemies: Vec::new(),
            items: Vec::new(),
            phase: GamePhase::Countdown,
            death_timer: 0.0,
            elapsed: 0.0,
            camera_x: 0.0,
            camera_locked: false,
            items_collected: 0,
            shortcut: None,
            result: None,
            request: None,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        };
        state.spawn_entities();
        state.center_camera();
        log::debug!(
            "Session started: {} enemies, {} items, spawn {:?}",
            state.enemies.len(),
            state.items.len(),
            state.player.pos
        );
        state
    }

    /// Configure the map a pipe leads to
    pub fn with_shortcut(mut self, map: MapDefinition) -> Self {
        self.shortcut = Some(map);
        self
    }

    /// Swap in a new map, keeping lives, elapsed time and counters
    pub fn load_level(&mut self, map: &MapDefinition) {
        self.layout = LevelLayout::build(map, self.tuning.tile_size);
        let spawn = player_spawn_pos(&self.layout, self.tuning.player_size);
        self.player.respawn(spawn, 0.0);
        self.spawn_entities();
        self.camera_locked = false;
        self.center_camera();
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_entities(&mut self) {
        let tile = self.tuning.tile_size;
        let scale = self.tuning.enemy_speed_scale;

        let enemy_spawns = self.layout.enemy_spawns.clone();
        self.enemies = enemy_spawns
            .iter()
            .map(|s| Enemy::spawn(self.next_entity_id(), s, tile, scale))
            .collect();

        let item_spawns = self.layout.item_spawns.clone();
        self.items = item_spawns
            .iter()
            .map(|s| Item::spawn(self.next_entity_id(), s, tile))
            .collect();
    }

    /// Where the player (re)appears on the current map
    pub fn spawn_point(&self) -> Vec2 {
        player_spawn_pos(&self.layout, self.tuning.player_size)
    }

    pub fn center_camera(&mut self) {
        self.camera_x = self.player.rect().center_x() - self.viewport_width / 2.0;
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.items.sort_by_key(|i| i.id);
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.phase,
            lives: self.player.lives,
            elapsed: self.elapsed,
            camera_x: self.camera_x,
            invincible: self.player.is_invincible(),
            countdown: if self.phase == GamePhase::Countdown {
                self.countdown.max(0.0).ceil() as u32
            } else {
                0
            },
        }
    }
}

/// Spawn cell top-left adjusted so the player's feet rest on the cell floor
fn player_spawn_pos(layout: &LevelLayout, player_size: f32) -> Vec2 {
    let spawn = layout.player_spawn;
    Vec2::new(spawn.x, spawn.y + layout.tile_size - player_size)
}
