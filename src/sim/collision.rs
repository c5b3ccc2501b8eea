//! Collision detection and response against static tile colliders
//!
//! Resolution is axis-separated: a body first moves vertically and is swept
//! against every collider, then moves horizontally and is swept again. Each
//! sweep snaps the body out along its own axis only, so a body touching a
//! floor and a wall in the same tick resolves both.
//!
//! The sweeps only reposition the body; callers decide what happens to the
//! velocity (the player stops, enemies turn around).

use super::rect::Rect;

/// Result of a vertical sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalHit {
    /// Body was falling and came to rest on top of a collider
    pub landed: bool,
    /// Body was rising and struck the underside of a collider
    pub ceiling: bool,
}

impl VerticalHit {
    pub fn any(&self) -> bool {
        self.landed || self.ceiling
    }
}

/// Which way the body was pushed back by a horizontal sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallHit {
    /// Moving right, stopped by a collider's left face
    Right,
    /// Moving left, stopped by a collider's right face
    Left,
}

/// Sweep a body that has just moved vertically with velocity `vy`
pub fn resolve_vertical<'a>(
    body: &mut Rect,
    vy: f32,
    colliders: impl IntoIterator<Item = &'a Rect>,
) -> VerticalHit {
    let mut hit = VerticalHit::default();
    if vy == 0.0 {
        return hit;
    }

    for collider in colliders {
        if !body.intersects(collider) {
            continue;
        }
        if vy > 0.0 {
            body.y = collider.top() - body.h;
            hit.landed = true;
        } else {
            body.y = collider.bottom();
            hit.ceiling = true;
        }
    }

    hit
}

/// Sweep a body that has just moved horizontally with velocity `vx`
///
/// Only colliders whose near face the body crossed this step count, which is
/// what keeps a body standing inside a column of blocks from being shoved
/// sideways.
pub fn resolve_horizontal<'a>(
    body: &mut Rect,
    vx: f32,
    colliders: impl IntoIterator<Item = &'a Rect>,
) -> Option<WallHit> {
    let mut hit = None;
    if vx == 0.0 {
        return hit;
    }

    for collider in colliders {
        if !body.intersects(collider) {
            continue;
        }
        if vx > 0.0 && body.left() < collider.left() {
            body.x = collider.left() - body.w;
            hit = Some(WallHit::Right);
        } else if vx < 0.0 && body.right() > collider.right() {
            body.x = collider.right();
            hit = Some(WallHit::Left);
        }
    }

    hit
}

/// Clamp a body horizontally into `[0, world_width]`; returns true if it was moved
pub fn clamp_to_world(body: &mut Rect, world_width: f32) -> bool {
    let max_x = (world_width - body.w).max(0.0);
    let clamped = body.x.clamp(0.0, max_x);
    let moved = clamped != body.x;
    body.x = clamped;
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Vec<Rect> {
        (0..4)
            .map(|i| Rect::new(i as f32 * 160.0, 1600.0, 160.0, 160.0))
            .collect()
    }

    #[test]
    fn test_landing_snaps_to_top() {
        let blocks = floor();
        let mut body = Rect::new(100.0, 1450.0, 160.0, 160.0);
        let hit = resolve_vertical(&mut body, 10.0, &blocks);
        assert!(hit.landed);
        assert!(!hit.ceiling);
        assert_eq!(body.bottom(), 1600.0);
    }

    #[test]
    fn test_ceiling_snaps_to_bottom() {
        let blocks = vec![Rect::new(0.0, 800.0, 160.0, 160.0)];
        let mut body = Rect::new(0.0, 950.0, 160.0, 160.0);
        let hit = resolve_vertical(&mut body, -15.0, &blocks);
        assert!(hit.ceiling);
        assert_eq!(body.top(), 960.0);
    }

    #[test]
    fn test_resting_body_has_no_contact_without_motion() {
        let blocks = floor();
        let mut body = Rect::new(100.0, 1440.0, 160.0, 160.0);
        assert!(!resolve_vertical(&mut body, 0.0, &blocks).any());
        assert_eq!(body.y, 1440.0);
    }

    #[test]
    fn test_wall_from_left() {
        let wall = vec![Rect::new(480.0, 1440.0, 160.0, 160.0)];
        let mut body = Rect::new(330.0, 1440.0, 160.0, 160.0);
        assert_eq!(resolve_horizontal(&mut body, 5.0, &wall), Some(WallHit::Right));
        assert_eq!(body.right(), 480.0);
    }

    #[test]
    fn test_wall_from_right() {
        let wall = vec![Rect::new(480.0, 1440.0, 160.0, 160.0)];
        let mut body = Rect::new(630.0, 1440.0, 160.0, 160.0);
        assert_eq!(resolve_horizontal(&mut body, -5.0, &wall), Some(WallHit::Left));
        assert_eq!(body.left(), 640.0);
    }

    #[test]
    fn test_floor_does_not_block_walking() {
        let blocks = floor();
        // Feet exactly on the floor seam between two tiles
        let mut body = Rect::new(150.0, 1440.0, 160.0, 160.0);
        assert_eq!(resolve_horizontal(&mut body, 5.0, &blocks), None);
        assert_eq!(body.x, 150.0);
    }

    #[test]
    fn test_corner_resolves_both_axes() {
        // Floor plus a wall block sitting on it
        let mut blocks = floor();
        blocks.push(Rect::new(320.0, 1440.0, 160.0, 160.0));

        // Body moves down into the floor, then right into the wall, in one tick
        let mut body = Rect::new(160.0, 1445.0, 160.0, 160.0);
        let vertical = resolve_vertical(&mut body, 5.0, &blocks);
        body.x += 5.0;
        let horizontal = resolve_horizontal(&mut body, 5.0, &blocks);

        assert!(vertical.landed);
        assert_eq!(horizontal, Some(WallHit::Right));
        assert_eq!(body.bottom(), 1600.0);
        assert_eq!(body.right(), 320.0);
    }

    #[test]
    fn test_clamp_to_world() {
        let mut body = Rect::new(-3.0, 0.0, 160.0, 160.0);
        assert!(clamp_to_world(&mut body, 3200.0));
        assert_eq!(body.x, 0.0);

        body.x = 3100.0;
        assert!(clamp_to_world(&mut body, 3200.0));
        assert_eq!(body.right(), 3200.0);

        body.x = 1000.0;
        assert!(!clamp_to_world(&mut body, 3200.0));
    }
}
