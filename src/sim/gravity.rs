//! Player-summoned gravity wells
//!
//! A ball lives for a fixed time and nudges the velocity of every eligible
//! body in range straight toward its center. Pulls are recomputed each frame;
//! a ball keeps no relationship to what it attracts.

use glam::Vec2;

use super::body::{Attractable, Body};
use super::polygon::regular_polygon;
use crate::ScreenBounds;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct GravityBall {
    pub body: Body,
    pub radius: f32,
    pub attraction_radius: f32,
    pub lifetime: f32,
    pub lifespan: f32,
    /// Velocity change per second applied to bodies in range
    pub force: f32,
    bounds: ScreenBounds,
}

impl GravityBall {
    /// Ball with the default tuning, centered on `center`
    pub fn new(center: Vec2, bounds: ScreenBounds) -> Self {
        Self::with_params(
            center,
            GRAVITY_BALL_RADIUS,
            GRAVITY_BALL_ATTRACTION_RADIUS,
            GRAVITY_BALL_LIFESPAN,
            GRAVITY_BALL_FORCE,
            bounds,
        )
    }

    pub fn with_params(
        center: Vec2,
        radius: f32,
        attraction_radius: f32,
        lifespan: f32,
        force: f32,
        bounds: ScreenBounds,
    ) -> Self {
        let mut body = Body::new(center - Vec2::splat(radius), radius * 2.0, radius * 2.0);
        body.set_collision_polygon(regular_polygon(
            Vec2::splat(radius),
            radius,
            GRAVITY_BALL_POLYGON_POINTS,
        ));
        Self {
            body,
            radius,
            attraction_radius,
            lifetime: 0.0,
            lifespan,
            force,
            bounds,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.body.update(dt);

        self.lifetime += dt;
        if self.lifetime >= self.lifespan {
            self.body.marked_for_removal = true;
        }

        self.body.bounce_within(self.bounds);
    }

    /// Glow opacity, fading out over the lifespan
    pub fn alpha(&self) -> f32 {
        if self.lifespan <= 0.0 {
            return 0.0;
        }
        (1.0 - self.lifetime / self.lifespan).clamp(0.0, 1.0)
    }

    /// Nearest point of the body's rect lies inside the attraction circle
    pub fn in_range(&self, body: &Body) -> bool {
        let center = self.body.center();
        body.rect().closest_point(center).distance(center) <= self.attraction_radius
    }

    /// Pull one body; returns whether it was in range
    pub fn attract(&self, target: &mut dyn Attractable, dt: f32) -> bool {
        if dt <= 0.0 || target.tied_anchor().is_some() || target.is_enemy() {
            return false;
        }
        if !self.in_range(target.body()) {
            return false;
        }
        let dir = (self.body.center() - target.body().center()).normalize_or_zero();
        target.body_mut().vel += dir * self.force * dt;
        target.mark_in_gravity_field();
        true
    }
}

/// Owns every live gravity ball
#[derive(Debug, Clone, Default)]
pub struct GravityBallSystem {
    pub balls: Vec<GravityBall>,
    bounds: ScreenBounds,
}

impl GravityBallSystem {
    pub fn new(bounds: ScreenBounds) -> Self {
        Self {
            balls: Vec::new(),
            bounds,
        }
    }

    pub fn create_gravity_ball(&mut self, center: Vec2) -> &GravityBall {
        log::debug!("gravity ball at ({:.0}, {:.0})", center.x, center.y);
        self.balls.push(GravityBall::new(center, self.bounds));
        &self.balls[self.balls.len() - 1]
    }

    /// Age every ball, then pull each eligible target toward each live ball
    pub fn update(&mut self, dt: f32, targets: &mut [&mut dyn Attractable]) {
        if dt <= 0.0 {
            return;
        }
        for ball in &mut self.balls {
            ball.update(dt);
        }
        self.balls.retain(|b| !b.body.marked_for_removal);

        for ball in &self.balls {
            for target in targets.iter_mut() {
                ball.attract(&mut **target, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::Projectile;
    use crate::sim::rain::RainDrop;

    fn ball_at(center: Vec2, attraction_radius: f32) -> GravityBall {
        GravityBall::with_params(center, 10.0, attraction_radius, 2.0, 500.0, ScreenBounds::default())
    }

    fn body_centered(center: Vec2) -> Body {
        Body::new(center - Vec2::splat(5.0), 10.0, 10.0)
    }

    #[test]
    fn test_pulls_body_in_range_only() {
        let ball = ball_at(Vec2::new(100.0, 100.0), 50.0);
        let mut near = body_centered(Vec2::new(120.0, 120.0));
        let mut far = body_centered(Vec2::new(200.0, 200.0));

        assert!(ball.attract(&mut near, 1.0 / 60.0));
        assert!(!ball.attract(&mut far, 1.0 / 60.0));

        assert!(near.vel.length() > 0.0);
        assert!(near.vel.x < 0.0 && near.vel.y < 0.0);
        assert_eq!(far.vel, Vec2::ZERO);
    }

    #[test]
    fn test_large_body_partially_in_range() {
        // Center is far but the near edge is inside the circle
        let ball = ball_at(Vec2::new(100.0, 100.0), 50.0);
        let mut wide = Body::new(Vec2::new(140.0, 80.0), 200.0, 40.0);
        assert!(ball.in_range(&wide));
        assert!(ball.attract(&mut wide, 0.1));
    }

    #[test]
    fn test_skips_tied_and_enemy_bodies() {
        let ball = ball_at(Vec2::new(100.0, 100.0), 50.0);
        let solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        drop.refresh_collisions(&[&solid], &mut rand_pcg::Pcg32::new(1, 1));
        assert!(drop.tied_to().is_some());
        let before = drop.body.vel;
        assert!(!ball.attract(&mut drop, 0.1));
        assert_eq!(drop.body.vel, before);

        let mut rng = rand_pcg::Pcg32::new(3, 3);
        let mut bat = crate::sim::bat::Bat::new(Vec2::new(100.0, 100.0), ScreenBounds::default(), &mut rng);
        assert!(!ball.attract(&mut bat, 0.1));
        assert_eq!(bat.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_projectile_gets_field_flag() {
        let ball = ball_at(Vec2::new(100.0, 100.0), 50.0);
        let mut shot = Projectile::new(Vec2::new(110.0, 100.0), Vec2::ZERO, 3.0, ScreenBounds::default());
        assert!(ball.attract(&mut shot, 0.1));
        assert!(shot.in_gravity_field);
        assert!(shot.body.vel.x < 0.0);
    }

    #[test]
    fn test_coincident_center_is_safe() {
        let ball = ball_at(Vec2::new(100.0, 100.0), 50.0);
        let mut body = body_centered(Vec2::new(100.0, 100.0));
        ball.attract(&mut body, 0.1);
        assert_eq!(body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_lifespan_and_alpha() {
        let mut system = GravityBallSystem::new(ScreenBounds::default());
        system.create_gravity_ball(Vec2::new(400.0, 300.0));
        assert_eq!(system.balls[0].alpha(), 1.0);

        system.update(1.0, &mut []);
        assert_eq!(system.balls.len(), 1);
        assert!((system.balls[0].alpha() - 0.5).abs() < 1e-4);

        system.update(1.0, &mut []);
        assert!(system.balls.is_empty());
    }

    #[test]
    fn test_system_pulls_targets() {
        let mut system = GravityBallSystem::new(ScreenBounds::default());
        system.create_gravity_ball(Vec2::new(400.0, 300.0));
        let mut body = body_centered(Vec2::new(450.0, 300.0));
        let mut shot = Projectile::new(Vec2::new(400.0, 350.0), Vec2::ZERO, 3.0, ScreenBounds::default());
        {
            let mut targets: Vec<&mut dyn Attractable> = vec![&mut body, &mut shot];
            system.update(0.1, &mut targets);
        }
        assert!(body.vel.x < 0.0);
        assert!(shot.body.vel.y < 0.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut system = GravityBallSystem::new(ScreenBounds::default());
        system.create_gravity_ball(Vec2::new(400.0, 300.0));
        let mut body = body_centered(Vec2::new(450.0, 300.0));
        {
            let mut targets: Vec<&mut dyn Attractable> = vec![&mut body];
            system.update(0.0, &mut targets);
        }
        assert_eq!(body.vel, Vec2::ZERO);
        assert_eq!(system.balls[0].lifetime, 0.0);
    }
}
