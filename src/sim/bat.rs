//! Bat enemy: hovers, patrols sideways and fires at players on its level

use glam::Vec2;
use rand::Rng;

use super::body::{Attractable, Body};
use super::polygon::ellipse_polygon;
use super::projectile::Projectile;
use crate::consts::*;
use crate::{ScreenBounds, random_unit_vector};

const BAT_POLYGON_POINTS: usize = 12;

#[derive(Debug, Clone)]
pub struct Bat {
    pub body: Body,
    /// Patrol direction, -1 or +1
    pub direction: f32,
    direction_timer: f32,
    direction_interval: f32,
    hover_time: f32,
    /// Hover displacement applied so far, so only the delta moves the bat
    hover_offset: f32,
    pub attack_timer: f32,
    pub attack_cooldown: f32,
    pub attack_speed: f32,
    /// Remaining self-immunity after firing
    pub immune_timer: f32,
    /// Shots fired by this bat that are still alive
    pub projectiles: Vec<Projectile>,
    bounds: ScreenBounds,
}

impl Bat {
    pub fn new<R: Rng + ?Sized>(pos: Vec2, bounds: ScreenBounds, rng: &mut R) -> Self {
        let mut body = Body::new(pos, BAT_WIDTH, BAT_HEIGHT);
        let half = Vec2::new(BAT_WIDTH, BAT_HEIGHT) / 2.0;
        body.set_collision_polygon(ellipse_polygon(half, half, BAT_POLYGON_POINTS));
        Self {
            body,
            direction: 1.0,
            direction_timer: 0.0,
            direction_interval: rng
                .random_range(BAT_DIRECTION_INTERVAL_MIN..=BAT_DIRECTION_INTERVAL_MAX),
            hover_time: 0.0,
            hover_offset: 0.0,
            attack_timer: rng.random_range(0.0..=BAT_INITIAL_ATTACK_TIMER_MAX),
            attack_cooldown: rng.random_range(BAT_ATTACK_COOLDOWN_MIN..=BAT_ATTACK_COOLDOWN_MAX),
            attack_speed: BAT_ATTACK_SPEED,
            immune_timer: 0.0,
            projectiles: Vec::new(),
            bounds,
        }
    }

    /// Hover, patrol, tick timers and advance owned projectiles
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if dt <= 0.0 {
            return;
        }

        self.hover_time = (self.hover_time + dt).rem_euclid(1.0 / BAT_HOVER_FREQUENCY);
        let offset = BAT_HOVER_AMPLITUDE
            * (std::f32::consts::TAU * BAT_HOVER_FREQUENCY * self.hover_time).sin();
        let dy = offset - self.hover_offset;
        self.hover_offset = offset;

        self.direction_timer += dt;
        if self.direction_timer >= self.direction_interval {
            self.direction = -self.direction;
            self.direction_timer = 0.0;
            self.direction_interval =
                rng.random_range(BAT_DIRECTION_INTERVAL_MIN..=BAT_DIRECTION_INTERVAL_MAX);
        }

        let dx = self.direction * BAT_MOVEMENT_SPEED * dt;
        self.body.pos += Vec2::new(dx, dy);
        self.body.vel = Vec2::new(dx, dy) / dt;
        self.body.acc = Vec2::ZERO;

        // Side walls only; hover is free to drift vertically
        if self.body.pos.x <= 0.0 {
            self.body.pos.x = 0.0;
            self.direction = 1.0;
        } else if self.body.pos.x + self.body.width() >= self.bounds.width {
            self.body.pos.x = self.bounds.width - self.body.width();
            self.direction = -1.0;
        }

        self.attack_timer += dt;
        self.immune_timer = (self.immune_timer - dt).max(0.0);

        for projectile in &mut self.projectiles {
            projectile.update(dt);
        }
        self.prune_projectiles();
    }

    pub fn prune_projectiles(&mut self) {
        self.projectiles.retain(|p| !p.body.marked_for_removal);
    }

    #[inline]
    pub fn is_immune(&self) -> bool {
        self.immune_timer > 0.0
    }

    /// Closest player (horizontally) whose center is within two bat heights vertically
    pub fn find_target_player<'a>(&self, players: &'a [Body]) -> Option<&'a Body> {
        let center = self.body.center();
        let range = self.body.height() * 2.0;
        players
            .iter()
            .filter(|p| (p.center().y - center.y).abs() < range)
            .min_by(|a, b| {
                let da = (a.center().x - center.x).abs();
                let db = (b.center().x - center.x).abs();
                da.total_cmp(&db)
            })
    }

    /// Fire at a target if the cooldown has elapsed; returns true when a shot was made
    pub fn try_attack<R: Rng + ?Sized>(&mut self, players: &[Body], rng: &mut R) -> bool {
        if self.attack_timer < self.attack_cooldown {
            return false;
        }
        let Some(target) = self.find_target_player(players).map(Body::center) else {
            return false;
        };
        self.shoot_at(target, rng);
        true
    }

    fn shoot_at<R: Rng + ?Sized>(&mut self, target: Vec2, rng: &mut R) {
        self.attack_timer = 0.0;
        self.attack_cooldown = rng.random_range(BAT_ATTACK_COOLDOWN_MIN..=BAT_ATTACK_COOLDOWN_MAX);
        self.immune_timer = BAT_PROJECTILE_IMMUNE_TIME;

        let origin = self.body.center();
        let dir = (target - origin)
            .try_normalize()
            .unwrap_or_else(|| random_unit_vector(rng));
        let projectile = Projectile::new(
            origin,
            dir * self.attack_speed,
            PROJECTILE_LIFESPAN,
            self.bounds,
        );
        log::debug!("bat {} fired projectile {}", self.body.id, projectile.body.id);
        self.projectiles.push(projectile);
    }
}

impl Attractable for Bat {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn is_enemy(&self) -> bool {
        true
    }
}
