//! Player movement and per-tick integration
//!
//! All velocities are in world units per 60 Hz frame and are scaled by
//! `frame_scale(dt)`, so the same tuning produces the same trajectory at any
//! fixed timestep.

use super::collision::{clamp_to_world, resolve_horizontal, resolve_vertical};
use super::rect::Rect;
use super::state::{Facing, Player};
use crate::frame_scale;
use crate::map::Colliders;
use crate::tuning::Tuning;

/// Set horizontal velocity from the directional input (right wins)
pub fn apply_move_input(player: &mut Player, left: bool, right: bool, tuning: &Tuning) {
    if left {
        player.vel.x = -tuning.move_speed;
        player.facing = Facing::Left;
    }
    if right {
        player.vel.x = tuning.move_speed;
        player.facing = Facing::Right;
    }
}

/// Start a jump; only from the ground and not while crouching
pub fn try_jump(player: &mut Player, tuning: &Tuning) -> bool {
    if !player.grounded || player.crouching || player.jumping {
        return false;
    }
    player.jumping = true;
    player.jump_held = true;
    player.jump_time = 0.0;
    player.jump_start_y = player.pos.y;
    player.jump_apex = Some(player.pos.y - tuning.max_jump_height);
    player.vel.y = tuning.jump_power;
    player.grounded = false;
    true
}

pub fn release_jump(player: &mut Player) {
    player.jump_held = false;
}

/// Halve the height, keeping the feet where they are; only on the ground
pub fn crouch(player: &mut Player) -> bool {
    if player.crouching {
        return true;
    }
    if !player.grounded {
        return false;
    }
    let half = player.standing_height / 2.0;
    player.pos.y += player.size.y - half;
    player.size.y = half;
    player.crouching = true;
    true
}

/// Return to full height; refused while something solid is overhead
pub fn stand_up(player: &mut Player, colliders: &Colliders) -> bool {
    if !player.crouching {
        return true;
    }
    let bottom = player.rect().bottom();
    let standing = Rect::new(
        player.pos.x,
        bottom - player.standing_height,
        player.size.x,
        player.standing_height,
    );
    if colliders.solids().any(|c| standing.intersects(c)) {
        return false;
    }
    player.pos.y = standing.y;
    player.size.y = player.standing_height;
    player.crouching = false;
    true
}

/// Vertical velocity update: powered ascent while the jump is held, gravity otherwise
fn integrate_vertical_velocity(player: &mut Player, tuning: &Tuning, dt: f32) {
    let scale = frame_scale(dt);

    if player.jumping && player.jump_held {
        player.jump_time += dt;
        let height = player.jump_start_y - player.pos.y;
        if player.jump_time < tuning.max_jump_time && height < tuning.max_jump_height {
            player.vel.y = tuning.jump_power;
            return;
        }
        player.jumping = false;
    } else if player.jumping {
        player.jumping = false;
        player.jump_time = 0.0;
    }

    player.vel.y += tuning.gravity * scale;
}

/// Advance the player by one fixed step against the static colliders
pub fn step_player(
    player: &mut Player,
    colliders: &Colliders,
    world_width: f32,
    tuning: &Tuning,
    dt: f32,
) {
    let scale = frame_scale(dt);

    player.grounded = false;
    integrate_vertical_velocity(player, tuning, dt);

    // Vertical axis first
    player.pos.y += player.vel.y * scale;
    let mut body = player.rect();
    let hit = resolve_vertical(&mut body, player.vel.y, colliders.solids());
    player.pos.y = body.y;
    if hit.landed {
        player.vel.y = 0.0;
        player.grounded = true;
        player.jumping = false;
        player.jump_apex = None;
    } else if hit.ceiling {
        player.vel.y = 0.0;
        player.jumping = false;
    }

    if let Some(apex) = player.jump_apex {
        if player.pos.y < apex {
            player.pos.y = apex;
            player.vel.y = player.vel.y.max(0.0);
        }
    }

    // Then horizontal
    player.pos.x += player.vel.x * scale;
    let mut body = player.rect();
    if resolve_horizontal(&mut body, player.vel.x, colliders.solids()).is_some() {
        player.pos.x = body.x;
        player.vel.x = 0.0;
    }

    let mut body = player.rect();
    if clamp_to_world(&mut body, world_width) {
        player.pos.x = body.x;
    }

    player.vel.x *= tuning.friction;

    if player.invincible_ms > 0.0 {
        player.invincible_ms = (player.invincible_ms - dt * 1000.0).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    /// A flat 20-tile floor with its top at y = 1600
    fn flat_floor() -> Colliders {
        Colliders {
            normal: (0..20)
                .map(|i| Rect::new(i as f32 * 160.0, 1600.0, 160.0, 160.0))
                .collect(),
            ..Colliders::default()
        }
    }

    fn standing_player(x: f32) -> Player {
        let mut player = Player::new(Vec2::new(x, 1440.0), 160.0, 3);
        player.grounded = true;
        player
    }

    #[test]
    fn test_resting_player_stays_grounded() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(400.0);
        for _ in 0..120 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
            assert!(player.grounded);
            assert_eq!(player.pos.y, 1440.0);
            assert_eq!(player.vel.y, 0.0);
        }
    }

    #[test]
    fn test_powered_ascent_then_gravity() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(400.0);
        assert!(try_jump(&mut player, &tuning));

        // Well inside the 0.3 s window the ascent is still powered
        for _ in 0..10 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
            assert_eq!(player.vel.y, tuning.jump_power);
        }

        // Past the window gravity has taken over
        for _ in 0..10 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
        }
        assert!(!player.jumping);
        assert!(player.vel.y > tuning.jump_power);

        let mut prev = player.vel.y;
        for _ in 0..5 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
            assert!(player.vel.y > prev);
            prev = player.vel.y;
        }
    }

    #[test]
    fn test_powered_ascent_ends_at_max_jump_time() {
        let floor = flat_floor();
        let tuning = Tuning::default();

        for dt in [1.0f32 / 30.0, 1.0 / 60.0, 1.0 / 144.0] {
            let mut player = standing_player(400.0);
            assert!(try_jump(&mut player, &tuning));

            // Jump held for half a second, past the powered window
            let hold_ticks = (0.5 / dt).round() as usize;
            let mut powered = 0;
            let mut first_unpowered = None;
            for _ in 0..hold_ticks {
                step_player(&mut player, &floor, 3200.0, &tuning, dt);
                if player.vel.y == tuning.jump_power {
                    assert!(first_unpowered.is_none(), "ascent re-powered at dt {dt}");
                    powered += 1;
                } else if first_unpowered.is_none() {
                    first_unpowered = Some(player.vel.y);
                }
            }

            let powered_secs = powered as f32 * dt;
            assert!(
                powered_secs <= tuning.max_jump_time + 1e-4,
                "powered for {powered_secs}s at dt {dt}"
            );
            assert!(
                powered_secs + dt >= tuning.max_jump_time - 1e-4,
                "ascent cut short at {powered_secs}s at dt {dt}"
            );
            // The first unpowered tick accelerates by exactly one tick of gravity
            assert_eq!(
                first_unpowered,
                Some(tuning.jump_power + tuning.gravity * frame_scale(dt))
            );
            assert!(!player.jumping);
            assert!(!player.grounded);
        }
    }

    #[test]
    fn test_release_ends_powered_ascent() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(400.0);
        try_jump(&mut player, &tuning);
        step_player(&mut player, &floor, 3200.0, &tuning, DT);

        release_jump(&mut player);
        step_player(&mut player, &floor, 3200.0, &tuning, DT);
        assert!(!player.jumping);
        assert!(player.vel.y > tuning.jump_power);
    }

    #[test]
    fn test_jump_requires_ground() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(0.0, 0.0), 160.0, 3);
        assert!(!try_jump(&mut player, &tuning));

        player.grounded = true;
        crouch(&mut player);
        assert!(!try_jump(&mut player, &tuning));
    }

    #[test]
    fn test_player_lands_after_jump() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(400.0);
        try_jump(&mut player, &tuning);
        for _ in 0..240 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
        }
        assert!(player.grounded);
        assert_eq!(player.pos.y, 1440.0);
        assert_eq!(player.jump_apex, None);
    }

    #[test]
    fn test_friction_and_wall_stop() {
        let mut colliders = flat_floor();
        colliders.normal.push(Rect::new(800.0, 1440.0, 160.0, 160.0));
        let tuning = Tuning::default();
        let mut player = standing_player(600.0);

        for _ in 0..60 {
            apply_move_input(&mut player, false, true, &tuning);
            step_player(&mut player, &colliders, 3200.0, &tuning, DT);
        }
        assert_eq!(player.rect().right(), 800.0);
        assert_eq!(player.vel.x, 0.0);

        // Released: velocity decays geometrically
        apply_move_input(&mut player, true, false, &tuning);
        step_player(&mut player, &colliders, 3200.0, &tuning, DT);
        let v0 = player.vel.x;
        step_player(&mut player, &colliders, 3200.0, &tuning, DT);
        assert!((player.vel.x - v0 * tuning.friction).abs() < 1e-4);
        assert_eq!(player.facing, Facing::Left);
    }

    #[test]
    fn test_right_wins_over_left() {
        let tuning = Tuning::default();
        let mut player = standing_player(0.0);
        apply_move_input(&mut player, true, true, &tuning);
        assert_eq!(player.vel.x, tuning.move_speed);
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn test_world_clamp() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(2.0);
        for _ in 0..10 {
            apply_move_input(&mut player, true, false, &tuning);
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
        }
        assert_eq!(player.pos.x, 0.0);
    }

    #[test]
    fn test_crouch_keeps_feet_and_blocks_standing_under_ceiling() {
        let mut colliders = flat_floor();
        let mut player = standing_player(400.0);

        crouch(&mut player);
        assert_eq!(player.size.y, 80.0);
        assert_eq!(player.rect().bottom(), 1600.0);

        // A block overhead at head height of a standing player
        colliders.normal.push(Rect::new(400.0, 1380.0, 160.0, 80.0));
        assert!(!stand_up(&mut player, &colliders));
        assert!(player.crouching);

        colliders.normal.pop();
        assert!(stand_up(&mut player, &colliders));
        assert_eq!(player.rect(), Rect::new(400.0, 1440.0, 160.0, 160.0));
    }

    #[test]
    fn test_no_crouch_in_mid_air() {
        let mut player = Player::new(Vec2::new(400.0, 600.0), 160.0, 3);
        assert!(!crouch(&mut player));
        assert!(!player.crouching);
        assert_eq!(player.size.y, 160.0);
    }

    #[test]
    fn test_invincibility_counts_down() {
        let floor = flat_floor();
        let tuning = Tuning::default();
        let mut player = standing_player(400.0);
        player.invincible_ms = 40.0;
        for _ in 0..2 {
            step_player(&mut player, &floor, 3200.0, &tuning, DT);
        }
        assert!(player.is_invincible());
        step_player(&mut player, &floor, 3200.0, &tuning, DT);
        assert_eq!(player.invincible_ms, 0.0);
        assert!(!player.is_invincible());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn timestep() -> impl Strategy<Value = f32> {
            prop_oneof![Just(1.0f32 / 30.0), Just(1.0f32 / 60.0), Just(1.0f32 / 144.0)]
        }

        proptest! {
            #[test]
            fn resting_on_floor_is_a_fixed_point(
                x in 0u32..3040,
                ticks in 1usize..200,
                dt in timestep(),
            ) {
                let floor = flat_floor();
                let tuning = Tuning::default();
                let mut player = standing_player(x as f32);
                for _ in 0..ticks {
                    step_player(&mut player, &floor, 3200.0, &tuning, dt);
                    prop_assert!(player.grounded);
                    prop_assert_eq!(player.pos.y, 1440.0);
                }
            }

            #[test]
            fn jump_never_exceeds_height_cap(
                dt in timestep(),
                hold_secs in 0.0f32..3.0,
                max_jump_time in 0.1f32..2.0,
            ) {
                let floor = flat_floor();
                let tuning = Tuning { max_jump_time, ..Tuning::default() };
                let mut player = standing_player(400.0);
                let start_y = player.pos.y;
                prop_assert!(try_jump(&mut player, &tuning));

                let ticks = (3.0 / dt) as usize;
                let mut held = 0.0;
                for _ in 0..ticks {
                    held += dt;
                    if held > hold_secs {
                        release_jump(&mut player);
                    }
                    step_player(&mut player, &floor, 3200.0, &tuning, dt);
                    prop_assert!(start_y - player.pos.y <= tuning.max_jump_height + 1e-3);
                }
            }
        }
    }
}
