//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position (pixels, y down) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in a buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    /// Byte offset of `color` within a vertex
    pub const COLOR_OFFSET: usize = std::mem::size_of::<[f32; 2]>();
}

/// Raw bytes ready for upload to a vertex buffer
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const PLAYER: [f32; 4] = [0.35, 0.3, 0.55, 1.0];
    pub const PLAYER_HURT: [f32; 4] = [0.9, 0.3, 0.3, 1.0];
    pub const BAT: [f32; 4] = [0.35, 0.2, 0.35, 1.0];
    pub const PROJECTILE: [f32; 4] = [0.9, 0.2, 0.9, 1.0];
    pub const PROJECTILE_CORE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const RAIN: [f32; 4] = [0.6, 0.6, 1.0, 0.8];
    pub const GRAVITY_BALL: [f32; 4] = [1.0, 0.65, 0.0, 1.0];
    /// Glow alpha is capped at this value and fades with the ball
    pub const GRAVITY_GLOW: [f32; 4] = [1.0, 0.39, 0.0, 0.39];
    pub const HEALTH_BAR_BACK: [f32; 4] = [0.39, 0.39, 0.39, 1.0];
    pub const HEALTH_HIGH: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const HEALTH_MID: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const HEALTH_LOW: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const GAME_OVER_TEXT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 0.7];

    /// 8-bit RGB to linear float RGBA
    pub fn rgb(c: [u8; 3], alpha: f32) -> [f32; 4] {
        [
            c[0] as f32 / 255.0,
            c[1] as f32 / 255.0,
            c[2] as f32 / 255.0,
            alpha,
        ]
    }
}
