//! Environmental bodies: bouncing circles and squares

use glam::Vec2;
use rand::Rng;

use super::body::{Attractable, Body};
use super::polygon::create_circle_polygon;
use crate::consts::*;
use crate::{ScreenBounds, random_unit_vector};

const CIRCLE_POLYGON_STEPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Square,
    /// Immovable circle
    BlueBall,
    /// Square that falls under its own gravity
    OrangeSquare,
}

impl ShapeKind {
    pub fn color(self) -> [u8; 3] {
        match self {
            ShapeKind::Circle => [80, 200, 120],
            ShapeKind::Square => [200, 80, 200],
            ShapeKind::BlueBall => [0, 0, 255],
            ShapeKind::OrangeSquare => [255, 165, 0],
        }
    }

    pub fn is_round(self) -> bool {
        matches!(self, ShapeKind::Circle | ShapeKind::BlueBall)
    }
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub body: Body,
    pub kind: ShapeKind,
    /// Seconds of hit highlight remaining
    pub hit_flash: f32,
    bounds: ScreenBounds,
}

impl Shape {
    /// Create a shape with its top-left corner at `pos`
    pub fn new(kind: ShapeKind, pos: Vec2, bounds: ScreenBounds) -> Self {
        let size = if kind.is_round() {
            CIRCLE_RADIUS * 2.0
        } else {
            SQUARE_SIZE
        };
        let mut body = Body::new(pos, size, size);
        if kind.is_round() {
            let r = size / 2.0;
            let mut circle = create_circle_polygon(Vec2::splat(r), r, 0.0, 360.0, CIRCLE_POLYGON_STEPS);
            // Drop the repeated closing point
            circle.pop();
            body.set_collision_polygon(circle);
        }
        Self {
            body,
            kind,
            hit_flash: 0.0,
            bounds,
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == ShapeKind::BlueBall
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.hit_flash = (self.hit_flash - dt).max(0.0);
        if self.is_static() {
            self.body.vel = Vec2::ZERO;
            self.body.acc = Vec2::ZERO;
            return;
        }

        if self.kind == ShapeKind::OrangeSquare {
            self.body.apply_force(Vec2::new(0.0, ORANGE_SQUARE_GRAVITY));
        }
        self.body.update(dt);
        self.body.bounce_within(self.bounds);
    }

    /// Head away from `other`, keeping the current speed
    pub fn bounce_off_object<R: Rng + ?Sized>(&mut self, other: &Body, rng: &mut R) {
        if self.is_static() {
            return;
        }
        let speed = match self.body.vel.length() {
            s if s > 0.0 => s,
            _ => SHAPE_DEFAULT_BOUNCE_SPEED,
        };
        let dir = (self.body.center() - other.center())
            .try_normalize()
            .unwrap_or_else(|| random_unit_vector(rng));
        self.body.vel = dir * speed;
    }

    pub fn flash(&mut self) {
        self.hit_flash = SHAPE_HIT_FLASH;
    }

    /// Render color, brightened while flashing
    pub fn color(&self) -> [u8; 3] {
        let base = self.kind.color();
        if self.hit_flash > 0.0 {
            base.map(|c| c.saturating_add(80))
        } else {
            base
        }
    }
}

impl Attractable for Shape {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
