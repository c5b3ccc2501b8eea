//! Enemy patrol AI and player contact classification

use super::collision::{resolve_horizontal, resolve_vertical};
use super::rect::Rect;
use super::state::Enemy;
use crate::frame_scale;
use crate::map::Colliders;
use crate::tuning::Tuning;

/// How a player-enemy overlap resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Player came down on the enemy's head
    Stomp,
    /// Any other touch
    Hit,
}

/// Classify an overlap; `player_vy` is the player's velocity before any
/// rebound this tick
pub fn classify_contact(player: &Rect, player_vy: f32, enemy: &Rect, tolerance: f32) -> Contact {
    if player_vy > 0.0 && player.bottom() < enemy.top() + tolerance {
        Contact::Stomp
    } else {
        Contact::Hit
    }
}

/// Advance one enemy: fall, walk, and turn at the patrol bound, walls and world edges
pub fn step_enemy(enemy: &mut Enemy, colliders: &Colliders, world_width: f32, tuning: &Tuning, dt: f32) {
    let scale = frame_scale(dt);

    enemy.vel.y += tuning.gravity * scale;
    enemy.pos.y += enemy.vel.y * scale;
    let mut body = enemy.rect();
    if resolve_vertical(&mut body, enemy.vel.y, colliders.solids()).any() {
        enemy.pos.y = body.y;
        enemy.vel.y = 0.0;
    }

    // Walls are swept against the direction actually moved this tick
    let moved_vx = enemy.vel.x;
    enemy.pos.x += moved_vx * scale;

    let offset = enemy.pos.x - enemy.origin_x;
    let mut turn = offset.abs() >= enemy.patrol && offset * moved_vx > 0.0;

    let mut body = enemy.rect();
    if resolve_horizontal(&mut body, moved_vx, colliders.solids()).is_some() {
        enemy.pos.x = body.x;
        turn = true;
    }
    if turn {
        enemy.reverse();
    }

    if enemy.pos.x < 0.0 {
        enemy.pos.x = 0.0;
        if enemy.vel.x < 0.0 {
            enemy.reverse();
        }
    } else if enemy.pos.x + enemy.size.x > world_width {
        enemy.pos.x = world_width - enemy.size.x;
        if enemy.vel.x > 0.0 {
            enemy.reverse();
        }
    }
}

/// Step every enemy and drop the ones that fell out of the world
pub fn step_enemies(
    enemies: &mut Vec<Enemy>,
    colliders: &Colliders,
    world_width: f32,
    world_height: f32,
    tuning: &Tuning,
    dt: f32,
) {
    for enemy in enemies.iter_mut() {
        step_enemy(enemy, colliders, world_width, tuning, dt);
    }
    enemies.retain(|e| {
        let inside = e.pos.y <= world_height;
        if !inside {
            log::debug!("Enemy {} fell out of the world", e.id);
        }
        inside
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::EnemySpawn;
    use crate::sim::state::{EnemyKind, Facing};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn floor(tiles: usize) -> Colliders {
        Colliders {
            normal: (0..tiles)
                .map(|i| Rect::new(i as f32 * 160.0, 1600.0, 160.0, 160.0))
                .collect(),
            ..Colliders::default()
        }
    }

    fn enemy_at(kind: EnemyKind, x: f32) -> Enemy {
        let spawn = EnemySpawn {
            kind,
            pos: Vec2::new(x, 1440.0),
        };
        Enemy::spawn(1, &spawn, 160.0, 1.0)
    }

    #[test]
    fn test_stomp_and_hit() {
        let enemy = Rect::new(0.0, 1440.0, 160.0, 160.0);
        let above = Rect::new(0.0, 1295.0, 160.0, 160.0);
        assert_eq!(classify_contact(&above, 3.0, &enemy, 20.0), Contact::Stomp);
        // Rising into it is never a stomp
        assert_eq!(classify_contact(&above, -3.0, &enemy, 20.0), Contact::Hit);
        // Sinking exactly the tolerance deep is already a hit
        let deep = Rect::new(0.0, 1300.0, 160.0, 160.0);
        assert_eq!(classify_contact(&deep, 3.0, &enemy, 20.0), Contact::Hit);

        let side = Rect::new(100.0, 1440.0, 160.0, 160.0);
        assert_eq!(classify_contact(&side, 3.0, &enemy, 20.0), Contact::Hit);
    }

    #[test]
    fn test_enemy_rests_on_floor() {
        let colliders = floor(20);
        let tuning = Tuning::default();
        let mut enemy = enemy_at(EnemyKind::Weak, 1600.0);
        for _ in 0..30 {
            step_enemy(&mut enemy, &colliders, 3200.0, &tuning, DT);
            assert_eq!(enemy.pos.y, 1440.0);
        }
        assert!(enemy.pos.x < 1600.0);
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn test_enemy_turns_at_wall() {
        let mut colliders = floor(20);
        colliders.normal.push(Rect::new(1280.0, 1440.0, 160.0, 160.0));
        let tuning = Tuning::default();
        let mut enemy = enemy_at(EnemyKind::Strong, 1450.0);

        // Five steps to touch the wall, the sixth pushes in and bounces
        for _ in 0..6 {
            step_enemy(&mut enemy, &colliders, 3200.0, &tuning, DT);
        }
        assert_eq!(enemy.pos.x, 1440.0);
        assert!(enemy.vel.x > 0.0);
        assert_eq!(enemy.facing, Facing::Right);
    }

    #[test]
    fn test_wall_at_patrol_bound_snaps_out() {
        let mut colliders = floor(20);
        let tuning = Tuning::default();
        let mut enemy = enemy_at(EnemyKind::Weak, 1600.0);
        enemy.reverse();
        // Half a unit short of the bound, wall half a unit ahead
        enemy.pos.x = enemy.origin_x + enemy.patrol - 0.5;
        let wall = Rect::new(enemy.pos.x + enemy.size.x + 0.5, 1440.0, 160.0, 160.0);
        colliders.normal.push(wall);

        step_enemy(&mut enemy, &colliders, 3200.0, &tuning, DT);
        assert!(!enemy.rect().intersects(&wall));
        assert_eq!(enemy.pos.x, wall.left() - enemy.size.x);
        // Bound and wall together turn it once
        assert!(enemy.vel.x < 0.0);
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn test_enemy_turns_at_world_edge() {
        let colliders = floor(20);
        let tuning = Tuning::default();
        let mut enemy = enemy_at(EnemyKind::Strong, 1.0);
        step_enemy(&mut enemy, &colliders, 3200.0, &tuning, DT);
        assert_eq!(enemy.pos.x, 0.0);
        assert!(enemy.vel.x > 0.0);
    }

    #[test]
    fn test_fallen_enemy_removed() {
        let tuning = Tuning::default();
        let mut enemies = vec![enemy_at(EnemyKind::Weak, 400.0)];
        for _ in 0..120 {
            step_enemies(&mut enemies, &Colliders::default(), 3200.0, 2400.0, &tuning, DT);
        }
        assert!(enemies.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn patrol_stays_symmetric_about_origin(
                tile in 6u32..12,
                strong in any::<bool>(),
            ) {
                let colliders = floor(20);
                let tuning = Tuning::default();
                let kind = if strong { EnemyKind::Strong } else { EnemyKind::Weak };
                let mut enemy = enemy_at(kind, tile as f32 * 160.0);
                let origin = enemy.origin_x;
                let step = enemy.vel.x.abs() * 1.01;

                let mut min_x = origin;
                let mut max_x = origin;
                for _ in 0..2000 {
                    step_enemy(&mut enemy, &colliders, 3200.0, &tuning, DT);
                    min_x = min_x.min(enemy.pos.x);
                    max_x = max_x.max(enemy.pos.x);
                    prop_assert!((enemy.pos.x - origin).abs() <= enemy.patrol + step);
                }

                // Both bounds were reached
                prop_assert!(origin - min_x >= enemy.patrol);
                prop_assert!(max_x - origin >= enemy.patrol);
            }
        }
    }
}
