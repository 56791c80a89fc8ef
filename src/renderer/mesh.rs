//! CPU tessellating backend

use glam::Vec2;

use super::shapes;
use super::vertex::{self, Vertex};
use super::{DrawCommand, Renderer, TextAlign};
use crate::settings::QualityPreset;

/// A text label left for an overlay pass
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub pos: Vec2,
    pub text: String,
    pub size: f32,
    pub align: TextAlign,
    pub color: [f32; 4],
}

/// Turns draw commands into one triangle list per frame
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub clear_color: [f32; 4],
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
    circle_segments: u32,
    frames: u64,
}

impl MeshRenderer {
    pub fn new(quality: QualityPreset) -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vertices: Vec::new(),
            labels: Vec::new(),
            circle_segments: quality.circle_segments(),
            frames: 0,
        }
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Vertex data of the last frame as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        vertex::as_bytes(&self.vertices)
    }

    fn tessellate(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => {
                self.clear_color = *color;
                self.vertices.clear();
                self.labels.clear();
            }
            DrawCommand::Rect { pos, size, color } => {
                self.vertices.extend(shapes::rect(*pos, *size, *color));
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => {
                self.vertices
                    .extend(shapes::circle(*center, *radius, *color, self.circle_segments));
            }
            DrawCommand::Polygon { points, color } => {
                self.vertices.extend(shapes::convex_polygon(points, *color));
            }
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => {
                self.vertices.extend(shapes::line(*from, *to, *width, *color));
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                align,
                color,
            } => self.labels.push(Label {
                pos: *pos,
                text: text.clone(),
                size: *size,
                align: *align,
                color: *color,
            }),
        }
    }
}

impl Renderer for MeshRenderer {
    fn render(&mut self, commands: &[DrawCommand]) {
        self.vertices.clear();
        self.labels.clear();
        for command in commands {
            self.tessellate(command);
        }
        self.frames += 1;
        log::trace!(
            "frame {}: {} vertices, {} labels",
            self.frames,
            self.vertices.len(),
            self.labels.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{colors, render_game};
    use crate::sim::{Game, GameConfig};

    #[test]
    fn test_commands_become_triangles_and_labels() {
        let mut renderer = MeshRenderer::new(QualityPreset::Low);
        renderer.render(&[
            DrawCommand::Clear(colors::BACKGROUND),
            DrawCommand::Rect {
                pos: Vec2::ZERO,
                size: Vec2::ONE,
                color: colors::TEXT,
            },
            DrawCommand::Circle {
                center: Vec2::ZERO,
                radius: 2.0,
                color: colors::TEXT,
            },
            DrawCommand::Text {
                pos: Vec2::ZERO,
                text: "1-1".into(),
                size: 12.0,
                align: TextAlign::Center,
                color: colors::TEXT,
            },
        ]);
        let circle = QualityPreset::Low.circle_segments() as usize * 3;
        assert_eq!(renderer.vertices.len(), 6 + circle);
        assert_eq!(renderer.vertices.len() % 3, 0);
        assert_eq!(renderer.labels.len(), 1);
        assert_eq!(renderer.vertex_bytes().len(), renderer.vertices.len() * Vertex::STRIDE);
    }

    #[test]
    fn test_frames_do_not_accumulate() {
        let game = Game::new(GameConfig::default());
        let mut renderer = MeshRenderer::new(QualityPreset::Medium);
        render_game(&game, &mut renderer);
        let first = renderer.vertices.len();
        render_game(&game, &mut renderer);
        assert!(first > 0);
        assert_eq!(renderer.vertices.len(), first);
        assert_eq!(renderer.frames(), 2);
    }
}
