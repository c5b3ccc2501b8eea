//! Fixed timestep simulation tick
//!
//! Advances a `SessionState` by one step through the phase machine:
//! Countdown -> Playing <-> Paused, Playing -> Dying -> Playing | GameOver,
//! Playing -> Victory.

use glam::Vec2;

use super::enemy::{Contact, classify_contact, step_enemies};
use super::physics;
use super::state::{GameEvent, GamePhase, ItemKind, RunResult, SessionRequest, SessionState};

/// Choices offered by the pause menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseChoice {
    Resume,
    Restart,
    ExitToMenu,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Held crouch; standing up happens when released
    pub crouch: bool,
    /// Jump pressed this tick
    pub jump_pressed: bool,
    /// Jump released this tick
    pub jump_released: bool,
    /// Pause toggle
    pub pause: bool,
    /// Selection made in the pause menu
    pub menu: Option<PauseChoice>,
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut SessionState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                resume(state);
                return;
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Countdown => {
            state.time_ticks += 1;
            tick_countdown(state, dt);
        }
        GamePhase::Playing => {
            state.time_ticks += 1;
            tick_playing(state, input, dt);
        }
        GamePhase::Dying => {
            state.time_ticks += 1;
            tick_dying(state, dt);
        }
        GamePhase::Paused => handle_pause_menu(state, input.menu),
        GamePhase::Victory | GamePhase::GameOver => {}
    }

    state.normalize_order();
}

fn resume(state: &mut SessionState) {
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::Resumed);
}

fn handle_pause_menu(state: &mut SessionState, choice: Option<PauseChoice>) {
    match choice {
        Some(PauseChoice::Resume) => resume(state),
        Some(PauseChoice::Restart) => state.request = Some(SessionRequest::Restart),
        Some(PauseChoice::ExitToMenu) => state.request = Some(SessionRequest::ExitToMenu),
        None => {}
    }
}

fn tick_countdown(state: &mut SessionState, dt: f32) {
    state.countdown -= dt;
    if state.countdown <= 0.0 {
        state.countdown = 0.0;
        state.phase = GamePhase::Playing;
        state.events.push(GameEvent::CountdownFinished);
    }
}

fn tick_playing(state: &mut SessionState, input: &TickInput, dt: f32) {
    // Input
    let player = &mut state.player;
    physics::apply_move_input(player, input.move_left, input.move_right, &state.tuning);
    if input.crouch {
        physics::crouch(player);
    } else if player.crouching {
        physics::stand_up(player, &state.layout.colliders);
    }
    if input.jump_pressed && physics::try_jump(player, &state.tuning) {
        state.events.push(GameEvent::Jumped);
    }
    if input.jump_released {
        physics::release_jump(player);
    }

    // Movement
    physics::step_player(
        &mut state.player,
        &state.layout.colliders,
        state.layout.world_width,
        &state.tuning,
        dt,
    );
    step_enemies(
        &mut state.enemies,
        &state.layout.colliders,
        state.layout.world_width,
        state.layout.world_height,
        &state.tuning,
        dt,
    );

    collect_items(state);

    if reached_goal(state) {
        finish(state, true);
        return;
    }

    if take_shortcut(state) {
        return;
    }

    if let Some(enemy_id) = resolve_enemy_contact(state) {
        log::debug!("Player hit by enemy {enemy_id}");
        state.events.push(GameEvent::PlayerHit { enemy_id });
        enter_dying(state);
        return;
    }

    if state.player.pos.y > state.layout.world_height {
        log::debug!("Player fell out of the world");
        state.events.push(GameEvent::PlayerFell);
        enter_dying(state);
        return;
    }

    state.elapsed += dt;
    update_camera(state);
}

fn collect_items(state: &mut SessionState) {
    let rect = state.player.rect();
    for item in state.items.iter_mut().filter(|i| !i.collected) {
        if !rect.intersects(&item.rect) {
            continue;
        }
        item.collected = true;
        match item.kind {
            ItemKind::Invincibility { duration_ms } => {
                state.player.invincible_ms = state.player.invincible_ms.max(duration_ms as f32);
            }
            ItemKind::Generic => state.items_collected += 1,
        }
        state.events.push(GameEvent::ItemCollected {
            item_id: item.id,
            kind: item.kind,
        });
    }
}

/// Goal tile or boss switch
fn reached_goal(state: &mut SessionState) -> bool {
    let rect = state.player.rect();

    if let Some(switch) = state.layout.boss_switch {
        if rect.intersects(&switch) {
            let events = &mut state.events;
            state.enemies.retain_mut(|e| {
                if !e.is_boss() {
                    return true;
                }
                e.health = 0;
                events.push(GameEvent::EnemyDefeated {
                    enemy_id: e.id,
                    kind: e.kind,
                });
                false
            });
            state.events.push(GameEvent::BossDefeated);
            log::info!("Boss switch triggered");
            return true;
        }
    }

    state.layout.goal.is_some_and(|goal| rect.intersects(&goal))
}

/// Pipe entered while moving up swaps to the alternate map once
fn take_shortcut(state: &mut SessionState) -> bool {
    if state.player.vel.y >= 0.0 || state.shortcut.is_none() {
        return false;
    }
    let rect = state.player.rect();
    if !state.layout.colliders.pipe.iter().any(|p| rect.intersects(p)) {
        return false;
    }
    let Some(map) = state.shortcut.take() else {
        return false;
    };

    state.load_level(&map);
    state.phase = GamePhase::Countdown;
    state.countdown = state.tuning.countdown_secs;
    state.events.push(GameEvent::ShortcutTaken);
    log::info!(
        "Shortcut taken into {}x{} map",
        map.grid.width(),
        map.grid.height()
    );
    true
}

/// Stomps are applied in place; returns the enemy that hurt the player, if any
fn resolve_enemy_contact(state: &mut SessionState) -> Option<u32> {
    let rect = state.player.rect();
    // Classification uses the velocity from before any rebound this tick
    let vy = state.player.vel.y;
    let mut hit_by = None;

    for enemy in state.enemies.iter_mut() {
        let enemy_rect = enemy.rect();
        if !rect.intersects(&enemy_rect) {
            continue;
        }
        match classify_contact(&rect, vy, &enemy_rect, state.tuning.stomp_tolerance) {
            Contact::Stomp => {
                if !enemy.is_boss() {
                    enemy.health -= 1;
                }
                // Rebound from on top so a surviving enemy is not touched again
                let top = enemy_rect.top() - state.player.size.y;
                state.player.pos.y = state.player.pos.y.min(top);
                state.player.vel.y = state.tuning.stomp_rebound;
                state.player.jumping = false;
                state.player.jump_apex = None;
                state.events.push(GameEvent::Stomped { enemy_id: enemy.id });
            }
            Contact::Hit => {
                if hit_by.is_none() && !state.player.is_invincible() {
                    hit_by = Some(enemy.id);
                }
            }
        }
    }

    let events = &mut state.events;
    state.enemies.retain(|e| {
        if e.health > 0 {
            return true;
        }
        events.push(GameEvent::EnemyDefeated {
            enemy_id: e.id,
            kind: e.kind,
        });
        false
    });

    hit_by
}

fn enter_dying(state: &mut SessionState) {
    state.phase = GamePhase::Dying;
    state.death_timer = state.tuning.death_freeze_secs;
    state.player.vel = Vec2::ZERO;
    state.player.jumping = false;
}

fn tick_dying(state: &mut SessionState, dt: f32) {
    state.death_timer -= dt;
    if state.death_timer > 0.0 {
        return;
    }
    state.death_timer = 0.0;
    state.player.lives = state.player.lives.saturating_sub(1);

    if state.player.lives == 0 {
        finish(state, false);
        return;
    }

    let spawn = state.spawn_point();
    state
        .player
        .respawn(spawn, state.tuning.respawn_invincibility_ms);
    state.phase = GamePhase::Playing;
    if !state.camera_locked {
        state.center_camera();
    }
    state.events.push(GameEvent::Respawned {
        lives: state.player.lives,
    });
    log::debug!("Respawned with {} lives", state.player.lives);
}

fn finish(state: &mut SessionState, victory: bool) {
    let result = RunResult {
        victory,
        elapsed: state.elapsed,
        lives: state.player.lives,
    };
    state.result = Some(result);
    if victory {
        state.phase = GamePhase::Victory;
        state.events.push(GameEvent::Victory);
    } else {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
    }
    log::info!(
        "Run finished: victory={} time={:.2}s lives={}",
        result.victory,
        result.elapsed,
        result.lives
    );
}

/// Follow the player horizontally until a boss comes into view
fn update_camera(state: &mut SessionState) {
    if state.camera_locked {
        return;
    }
    state.center_camera();

    if !state.layout.boss_battle {
        return;
    }
    let view_left = state.camera_x;
    let view_right = state.camera_x + state.viewport_width;
    let boss_in_view = state
        .enemies
        .iter()
        .filter(|e| e.is_boss())
        .map(|e| e.rect().right())
        .any(|right| right >= view_left && right <= view_right);
    if boss_in_view {
        state.camera_locked = true;
        state.events.push(GameEvent::CameraLocked);
        log::info!("Camera locked at x={:.0}", state.camera_x);
    }
}
