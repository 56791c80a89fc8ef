//! The hooded player character

use glam::Vec2;

use super::body::{Attractable, Body};
use super::polygon::{combine_polygons, create_rect_polygon, ellipse_polygon};
use crate::ScreenBounds;
use crate::consts::*;

const HOOD_POLYGON_POINTS: usize = 24;

/// Held movement keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    /// Invulnerability remaining after a hit
    hurt_timer: f32,
    bounds: ScreenBounds,
}

impl Player {
    pub fn new(pos: Vec2, bounds: ScreenBounds) -> Self {
        let mut body = Body::new(pos, PLAYER_SIZE, PLAYER_SIZE);
        body.set_collision_polygon(hooded_figure_polygon(PLAYER_SIZE, PLAYER_SIZE));
        body.set_property("type", "player");
        Self {
            body,
            health: PLAYER_MAX_HEALTH,
            hurt_timer: 0.0,
            bounds,
        }
    }

    /// Player centered on the screen
    pub fn spawn(bounds: ScreenBounds) -> Self {
        Self::new(bounds.center() - Vec2::splat(PLAYER_SIZE / 2.0), bounds)
    }

    /// Replace this frame's acceleration from the held keys
    pub fn handle_input(&mut self, keys: MoveKeys) {
        let mut acc = Vec2::ZERO;
        if keys.left {
            acc.x = -PLAYER_MOVE_ACCEL;
        }
        if keys.right {
            acc.x = PLAYER_MOVE_ACCEL;
        }
        if keys.up {
            acc.y = -PLAYER_MOVE_ACCEL;
        }
        if keys.down {
            acc.y = PLAYER_MOVE_ACCEL;
        }
        self.body.acc = acc;
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.hurt_timer = (self.hurt_timer - dt).max(0.0);
        self.body.update(dt);
        self.body.bounce_within(self.bounds);
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.hurt_timer > 0.0
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage unless recently hurt; returns whether it landed
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.is_invulnerable() || !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        self.hurt_timer = PLAYER_HURT_COOLDOWN;
        log::debug!("player hit for {amount}, health {}", self.health);
        if !self.is_alive() {
            self.body.marked_for_removal = true;
        }
        true
    }
}

impl Attractable for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// Convex outline of a robe (lower 60%) topped with a wide elliptical hood
pub fn hooded_figure_polygon(width: f32, height: f32) -> Vec<Vec2> {
    let robe_height = (height * 0.6).floor();
    let robe_top = height - robe_height;
    let robe = create_rect_polygon(0.0, robe_top, width, robe_height);

    let hood_radius = (width * 0.4).floor();
    let hood_center = Vec2::new((width / 2.0).floor(), robe_top);
    let hood_radii = Vec2::new(hood_radius * 2.1, hood_radius * 1.7) / 2.0;
    let hood = ellipse_polygon(hood_center, hood_radii, HOOD_POLYGON_POINTS);

    combine_polygons(&[robe, hood])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::polygon::is_convex;

    #[test]
    fn test_outline_is_convex_and_covers_robe() {
        let poly = hooded_figure_polygon(50.0, 50.0);
        assert!(is_convex(&poly));
        for corner in [Vec2::new(0.0, 50.0), Vec2::new(50.0, 50.0)] {
            assert!(poly.contains(&corner), "missing {corner:?}");
        }
        let top = poly.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((top - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_input_sets_acceleration_each_frame() {
        let mut player = Player::spawn(ScreenBounds::default());
        player.handle_input(MoveKeys {
            right: true,
            up: true,
            ..Default::default()
        });
        assert_eq!(player.body.acc, Vec2::new(PLAYER_MOVE_ACCEL, -PLAYER_MOVE_ACCEL));
        player.update(0.1);
        assert_eq!(player.body.acc, Vec2::ZERO);
        assert!(player.body.vel.x > 0.0 && player.body.vel.y < 0.0);
    }

    #[test]
    fn test_bounces_off_every_wall() {
        let mut player = Player::new(Vec2::new(5.0, 545.0), ScreenBounds::default());
        player.body.vel = Vec2::new(-100.0, 100.0);
        player.update(0.1);
        assert_eq!(player.body.pos, Vec2::new(0.0, 550.0));
        assert_eq!(player.body.vel, Vec2::new(100.0, -100.0));
    }

    #[test]
    fn test_damage_has_cooldown_and_kills() {
        let mut player = Player::spawn(ScreenBounds::default());
        assert!(player.take_damage(30));
        assert!(!player.take_damage(30));
        assert_eq!(player.health, 70);

        player.update(PLAYER_HURT_COOLDOWN + 0.01);
        assert!(player.take_damage(80));
        assert_eq!(player.health, 0);
        assert!(player.body.marked_for_removal);
        assert!(!player.is_alive());
    }
}
