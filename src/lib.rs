//! Rain Runner - a rainy 2D arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, rain, gravity wells, levels)
//! - `renderer`: Draw-command extraction and CPU tessellation for a graphics backend
//! - `audio`: Fire-and-forget sound hooks
//! - `settings`: Player-facing configuration

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, AudioSink, SoundEffect};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Frame rate the game was tuned at; rain accelerations are normalized to it
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest frame delta the driver will feed the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default screen dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    // --- Player ---
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Acceleration applied per held movement key (pixels/s²)
    pub const PLAYER_MOVE_ACCEL: f32 = 300.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    /// Seconds of invulnerability after taking a hit
    pub const PLAYER_HURT_COOLDOWN: f32 = 0.5;
    pub const PROJECTILE_DAMAGE: i32 = 10;
    pub const SHAPE_CONTACT_DAMAGE: i32 = 5;

    // --- Bat ---
    pub const BAT_WIDTH: f32 = 40.0;
    pub const BAT_HEIGHT: f32 = 30.0;
    pub const BAT_MOVEMENT_SPEED: f32 = 100.0;
    pub const BAT_HOVER_AMPLITUDE: f32 = 20.0;
    pub const BAT_HOVER_FREQUENCY: f32 = 2.0;
    pub const BAT_DIRECTION_INTERVAL_MIN: f32 = 2.0;
    pub const BAT_DIRECTION_INTERVAL_MAX: f32 = 4.0;
    pub const BAT_ATTACK_COOLDOWN_MIN: f32 = 1.5;
    pub const BAT_ATTACK_COOLDOWN_MAX: f32 = 3.0;
    pub const BAT_INITIAL_ATTACK_TIMER_MAX: f32 = 1.0;
    pub const BAT_ATTACK_SPEED: f32 = 150.0;
    pub const BAT_PROJECTILE_IMMUNE_TIME: f32 = 0.2;

    // --- Projectile ---
    pub const PROJECTILE_RADIUS: f32 = 5.0;
    pub const PROJECTILE_LIFESPAN: f32 = 3.0;
    pub const PROJECTILE_POLYGON_POINTS: usize = 8;

    // --- Rain ---
    pub const RAIN_SPAWN_RATE: f32 = 70.0;
    pub const RAIN_SPAWN_MARGIN: f32 = 50.0;
    pub const RAIN_DEFAULT_VELOCITY_Y: f32 = 200.0;
    /// 128000 px/s² applied with an extra frame factor in the tuned build
    pub const RAIN_GRAVITY: f32 = 128_000.0 / REFERENCE_FPS;
    pub const RAIN_MAX_VELOCITY: f32 = 400.0;
    pub const RAIN_MAX_UPWARD_VELOCITY: f32 = 200.0;
    pub const RAIN_DROP_WIDTH: f32 = 2.0;
    pub const RAIN_MIN_LENGTH: f32 = 4.0;
    pub const RAIN_MAX_LENGTH: f32 = 7.0;
    pub const RAIN_REPULSION_FORCE: f32 = 100.0 / REFERENCE_FPS;
    pub const RAIN_DEPTH_REPULSION_MULTIPLIER: f32 = 10.0;
    /// Quadratic drag coefficients (per pixel), normalized to the reference frame
    pub const RAIN_AIR_FRICTION: f32 = 1.5 / REFERENCE_FPS;
    pub const RAIN_COLLISION_FRICTION: f32 = 200.0 / REFERENCE_FPS;
    /// Uniform per-axis acceleration jitter (px/s²)
    pub const RAIN_JITTER: f32 = 50.0;
    pub const RAIN_TIE_VELOCITY_SCALE: f32 = 0.1;
    /// Downward push ratio for drops pushed out of a body's side
    pub const RAIN_SIDE_DOWNWARD_BIAS: f32 = 2.0;
    /// Horizontal spread for drops pushed out through a body's top
    pub const RAIN_TOP_SPREAD: f32 = 0.3;
    /// Minimum downward speed for a drop that slides off a body's side
    pub const RAIN_SIDE_MIN_FALL_SPEED: f32 = 50.0;
    pub const WIND_MIN: f32 = -10.0;
    pub const WIND_MAX: f32 = 10.0;
    pub const WIND_CHANGE_INTERVAL: f32 = 1.0;
    pub const WIND_CHANGE_SPEED: f32 = 0.2;

    // --- Gravity ball ---
    pub const GRAVITY_BALL_RADIUS: f32 = 10.0;
    pub const GRAVITY_BALL_ATTRACTION_RADIUS: f32 = 100.0;
    pub const GRAVITY_BALL_LIFESPAN: f32 = 2.0;
    pub const GRAVITY_BALL_FORCE: f32 = 500.0;
    pub const GRAVITY_BALL_POLYGON_POINTS: usize = 12;

    // --- Environmental bodies ---
    pub const CIRCLE_RADIUS: f32 = 15.0;
    pub const SQUARE_SIZE: f32 = 30.0;
    /// Speed given to a stationary body that gets bounced
    pub const SHAPE_DEFAULT_BOUNCE_SPEED: f32 = 100.0;
    pub const ORANGE_SQUARE_GRAVITY: f32 = 200.0;
    /// Momentum per world for the roaming shape (world 2 onward)
    pub const SHAPE_MOMENTUM_PER_WORLD: f32 = 60.0;
    pub const SHAPE_MOMENTUM_START_WORLD: u32 = 2;
    pub const SHAPE_HIT_FLASH: f32 = 0.25;

    // --- Portal ---
    pub const PORTAL_SIZE: f32 = 50.0;
    pub const PORTAL_BOTTOM_OFFSET: f32 = 80.0;
    /// Degrees per second
    pub const PORTAL_ROTATION_SPEED: f32 = 90.0;
    pub const PORTAL_COLOR_TRANSITION_SPEED: f32 = 5.0;
    pub const PORTAL_LOCKED_COLOR: [u8; 3] = [0, 0, 255];
    pub const PORTAL_UNLOCKED_COLOR: [u8; 3] = [255, 0, 0];

    // --- Level ---
    pub const LEVELS_PER_WORLD: u32 = 3;
    pub const MAX_BATS_PER_LEVEL: u32 = 3;
    pub const BAT_SPAWN_Y: f32 = 80.0;
}

/// Playfield dimensions handed to every body that bounces off or leaves the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: f32,
    pub height: f32,
}

impl ScreenBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self::new(consts::SCREEN_WIDTH, consts::SCREEN_HEIGHT)
    }
}

/// Uniformly random unit vector, used whenever a direction is mandatory but undefined
#[inline]
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

/// Move `current` toward `target` by at most `max_step` per channel
#[inline]
pub fn step_color(current: [u8; 3], target: [u8; 3], max_step: i32) -> [u8; 3] {
    let max_step = max_step.clamp(0, u8::MAX as i32);
    let mut out = current;
    for i in 0..3 {
        let c = current[i] as i32;
        let t = target[i] as i32;
        out[i] = if c < t {
            (c + max_step).min(t) as u8
        } else {
            (c - max_step).max(t) as u8
        };
    }
    out
}
