//! Enemy projectiles

use glam::Vec2;

use super::body::{Attractable, Body};
use super::polygon::regular_polygon;
use crate::ScreenBounds;
use crate::consts::*;

/// Short-lived round bullet; moves on velocity alone
#[derive(Debug, Clone)]
pub struct Projectile {
    pub body: Body,
    pub radius: f32,
    /// Seconds alive so far
    pub lifetime: f32,
    pub lifespan: f32,
    /// Set by a gravity well this frame; tint only
    pub in_gravity_field: bool,
    bounds: ScreenBounds,
}

impl Projectile {
    /// Create a projectile centered on `center`
    pub fn new(center: Vec2, vel: Vec2, lifespan: f32, bounds: ScreenBounds) -> Self {
        let radius = PROJECTILE_RADIUS;
        let mut body = Body::new(center - Vec2::splat(radius), radius * 2.0, radius * 2.0);
        body.vel = vel;
        body.set_collision_polygon(regular_polygon(
            Vec2::splat(radius),
            radius,
            PROJECTILE_POLYGON_POINTS,
        ));
        Self {
            body,
            radius,
            lifetime: 0.0,
            lifespan,
            in_gravity_field: false,
            bounds,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.in_gravity_field = false;
        if dt <= 0.0 {
            return;
        }

        // Acceleration is ignored; velocity changes come from outside
        self.body.pos += self.body.vel * dt;
        self.body.acc = Vec2::ZERO;

        self.lifetime += dt;
        if self.lifetime >= self.lifespan {
            self.body.marked_for_removal = true;
        }

        if self.is_off_screen() {
            self.body.marked_for_removal = true;
        }
    }

    /// Outside the screen expanded by one diameter on every side
    pub fn is_off_screen(&self) -> bool {
        let margin = self.radius * 2.0;
        let p = self.body.pos;
        p.x < -margin
            || p.y < -margin
            || p.x > self.bounds.width + margin
            || p.y > self.bounds.height + margin
    }
}

impl Attractable for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn mark_in_gravity_field(&mut self) {
        self.in_gravity_field = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_on_velocity_only() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::new(50.0, 0.0), 3.0, ScreenBounds::default());
        p.body.apply_force(Vec2::new(0.0, 1000.0));
        p.update(0.5);
        assert_eq!(p.body.center(), Vec2::new(125.0, 100.0));
        assert_eq!(p.body.vel, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_expires_after_lifespan() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0, ScreenBounds::default());
        p.update(0.6);
        assert!(!p.body.marked_for_removal);
        p.update(0.6);
        assert!(p.body.marked_for_removal);
    }

    #[test]
    fn test_off_screen_marks_for_removal() {
        let mut p = Projectile::new(Vec2::new(795.0, 300.0), Vec2::new(100.0, 0.0), 30.0, ScreenBounds::default());
        p.update(0.1);
        assert!(!p.body.marked_for_removal);
        p.update(0.2);
        assert!(p.body.marked_for_removal);
    }

    #[test]
    fn test_gravity_flag_resets_each_update() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 3.0, ScreenBounds::default());
        p.mark_in_gravity_field();
        assert!(p.in_gravity_field);
        p.update(0.016);
        assert!(!p.in_gravity_field);
    }

    #[test]
    fn test_polygon_is_centered_on_body() {
        let p = Projectile::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 3.0, ScreenBounds::default());
        let poly = p.body.collision_polygon();
        assert_eq!(poly.len(), PROJECTILE_POLYGON_POINTS);
        for point in poly {
            assert!((point.distance(Vec2::new(100.0, 100.0)) - PROJECTILE_RADIUS).abs() < 1e-3);
        }
    }
}
