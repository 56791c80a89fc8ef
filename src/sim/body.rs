//! Shared rigid-body state for every simulated entity
//!
//! A [`Body`] is position (top-left), fixed size, velocity and a transient
//! acceleration accumulator. Acceleration is a per-frame input: callers set
//! or accumulate it before [`Body::update`], which integrates and clears it.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec2;
use serde_json::Value;

use super::collision::{Rect, polygons_collide};
use super::polygon::{Polygon, create_rect_polygon, translate};
use crate::ScreenBounds;

/// Stable identity used for non-owning references between entities
pub type EntityId = u32;

static NEXT_ENTITY_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a fresh entity ID
pub fn next_entity_id() -> EntityId {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Accumulated for the current frame, cleared by `update`
    pub acc: Vec2,
    pub marked_for_removal: bool,
    width: f32,
    height: f32,
    /// Local-space collision polygon, defaults to the bounding rect
    local_polygon: OnceCell<Polygon>,
    properties: HashMap<String, Value>,
}

impl Body {
    pub fn new(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            id: next_entity_id(),
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            marked_for_removal: false,
            width,
            height,
            local_polygon: OnceCell::new(),
            properties: HashMap::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Override the local-space collision polygon
    pub fn set_collision_polygon(&mut self, local_points: Polygon) {
        self.local_polygon = OnceCell::from(local_points);
    }

    /// Local-space polygon, generating the default rect once
    pub fn local_polygon(&self) -> &Polygon {
        self.local_polygon
            .get_or_init(|| create_rect_polygon(0.0, 0.0, self.width, self.height))
    }

    /// World-space collision polygon at the current position
    pub fn collision_polygon(&self) -> Polygon {
        translate(self.local_polygon(), self.pos)
    }

    /// AABB reject, then SAT on the world polygons
    pub fn collides_with(&self, other: &Body) -> bool {
        if !self.rect().intersects(&other.rect()) {
            return false;
        }
        polygons_collide(&self.collision_polygon(), &other.collision_polygon())
    }

    /// Integrate one step and clear the acceleration accumulator
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.vel += self.acc * dt;
        self.pos += self.vel * dt;
        self.acc = Vec2::ZERO;
    }

    /// Add to this frame's acceleration
    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force;
    }

    /// Reflect off the screen walls and clamp inside; returns whether a wall was hit
    pub fn bounce_within(&mut self, bounds: ScreenBounds) -> bool {
        let max_x = (bounds.width - self.width).max(0.0);
        let max_y = (bounds.height - self.height).max(0.0);
        let mut hit = false;

        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.vel.x.abs();
            hit = true;
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x = -self.vel.x.abs();
            hit = true;
        }

        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.abs();
            hit = true;
        } else if self.pos.y > max_y {
            self.pos.y = max_y;
            self.vel.y = -self.vel.y.abs();
            hit = true;
        }
        hit
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }
}

/// Capability of bodies that gravity wells may pull on
///
/// Only the few kinds that carry extra state override the defaults.
pub trait Attractable {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Body this one is resting on, if any; tied bodies ignore gravity wells
    fn tied_anchor(&self) -> Option<EntityId> {
        None
    }

    fn is_enemy(&self) -> bool {
        false
    }

    /// Visual-only flag for bodies drawn differently inside a field
    fn mark_in_gravity_field(&mut self) {}
}

impl Attractable for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}
