//! Level exit portal

use glam::Vec2;

use super::body::Body;
use super::polygon::{Polygon, regular_polygon};
use crate::consts::*;
use crate::step_color;

const PORTAL_POLYGON_POINTS: usize = 12;
const SPIRAL_LOOPS: f32 = 3.0;
const SPIRAL_POINTS: usize = 120;

/// Spinning goal marker, inert until the level's enemies are cleared
#[derive(Debug, Clone)]
pub struct Portal {
    pub body: Body,
    pub enabled: bool,
    pub color: [u8; 3],
    pub target_color: [u8; 3],
    /// Degrees, kept in [0, 360)
    pub rotation: f32,
    spiral: Polygon,
}

impl Portal {
    pub fn new(pos: Vec2) -> Self {
        let mut body = Body::new(pos, PORTAL_SIZE, PORTAL_SIZE);
        let half = Vec2::splat(PORTAL_SIZE / 2.0);
        body.set_collision_polygon(regular_polygon(half, PORTAL_SIZE / 2.0, PORTAL_POLYGON_POINTS));

        let max_radius = PORTAL_SIZE / 2.0 * 0.9;
        let spiral = (0..SPIRAL_POINTS)
            .map(|i| {
                let t = i as f32 / SPIRAL_POINTS as f32;
                let angle = std::f32::consts::TAU * SPIRAL_LOOPS * t;
                half + Vec2::from_angle(angle) * max_radius * t
            })
            .collect();

        Self {
            body,
            enabled: false,
            color: PORTAL_LOCKED_COLOR,
            target_color: PORTAL_LOCKED_COLOR,
            rotation: 0.0,
            spiral,
        }
    }

    /// Open the portal; it turns fully red
    pub fn enable(&mut self) {
        if !self.enabled {
            log::info!("portal unlocked");
        }
        self.enabled = true;
        self.target_color = PORTAL_UNLOCKED_COLOR;
    }

    /// Point the color at the kill progress, 0.0 to 1.0
    pub fn progress_color(&mut self, progress: f32) {
        let p = progress.clamp(0.0, 1.0);
        self.target_color = [(p * 255.0) as u8, 0, (255.0 * (1.0 - p)) as u8];
    }

    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.rotation = (self.rotation + PORTAL_ROTATION_SPEED * dt).rem_euclid(360.0);
        let step = (PORTAL_COLOR_TRANSITION_SPEED * dt * 255.0) as i32;
        self.color = step_color(self.color, self.target_color, step);
    }

    /// Always false while locked, whatever the overlap
    pub fn collides_with(&self, other: &Body) -> bool {
        self.enabled && self.body.collides_with(other)
    }

    /// Swirl line strip in world space, before rotation
    pub fn spiral_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.spiral.iter().map(|&p| p + self.body.pos)
    }
}
