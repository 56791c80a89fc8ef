//! Rendering module
//!
//! The simulation is drawn in two steps: [`extract_scene`] flattens a
//! [`Game`] into backend-neutral [`DrawCommand`]s, then a [`Renderer`]
//! consumes them. [`MeshRenderer`] is the CPU backend that tessellates the
//! commands into a vertex list ready for upload.

pub mod mesh;
pub mod shapes;
pub mod vertex;

pub use mesh::MeshRenderer;
pub use vertex::{Vertex, colors};

use glam::Vec2;

use crate::consts::*;
use crate::sim::{Game, GamePhase, Object};

const PORTAL_LINE_WIDTH: f32 = 3.0;
const PORTAL_GLOW_PAD: f32 = 5.0;
const PORTAL_GLOW_ALPHA: f32 = 100.0 / 255.0;
const HUD_MARGIN: f32 = 20.0;
const HEALTH_BAR_SIZE: Vec2 = Vec2::new(100.0, 20.0);
const HEALTH_BAR_Y: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Center,
    /// `pos` is the top-right corner
    TopRight,
}

/// One primitive for a backend to draw, in screen pixels (y down)
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear([f32; 4]),
    Rect {
        pos: Vec2,
        size: Vec2,
        color: [f32; 4],
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    /// Filled convex polygon
    Polygon {
        points: Vec<Vec2>,
        color: [f32; 4],
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: [f32; 4],
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        align: TextAlign,
        color: [f32; 4],
    },
}

/// A graphics backend
pub trait Renderer {
    fn render(&mut self, commands: &[DrawCommand]);
}

/// Draw the current frame of `game` with `renderer`
pub fn render_game(game: &Game, renderer: &mut dyn Renderer) {
    renderer.render(&extract_scene(game));
}

/// Flatten the game into draw commands, back to front
pub fn extract_scene(game: &Game) -> Vec<DrawCommand> {
    let mut out = vec![DrawCommand::Clear(colors::BACKGROUND)];

    push_portal(game, &mut out);

    for object in &game.level.objects {
        match object {
            Object::Player(player) => out.push(DrawCommand::Polygon {
                points: player.body.collision_polygon(),
                color: if player.is_invulnerable() {
                    colors::PLAYER_HURT
                } else {
                    colors::PLAYER
                },
            }),
            Object::Bat(bat) => {
                out.push(DrawCommand::Polygon {
                    points: bat.body.collision_polygon(),
                    color: colors::BAT,
                });
                for shot in &bat.projectiles {
                    // Orange tint while pulled by a gravity ball
                    let color = if shot.in_gravity_field {
                        [
                            (colors::PROJECTILE[0] + 40.0 / 255.0).min(1.0),
                            (colors::PROJECTILE[1] + 20.0 / 255.0).min(1.0),
                            colors::PROJECTILE[2],
                            1.0,
                        ]
                    } else {
                        colors::PROJECTILE
                    };
                    let center = shot.body.center();
                    out.push(DrawCommand::Circle {
                        center,
                        radius: shot.radius,
                        color,
                    });
                    out.push(DrawCommand::Circle {
                        center,
                        radius: shot.radius * 0.3,
                        color: colors::PROJECTILE_CORE,
                    });
                }
            }
            Object::Shape(shape) => {
                let color = colors::rgb(shape.color(), 1.0);
                if shape.kind.is_round() {
                    out.push(DrawCommand::Circle {
                        center: shape.body.center(),
                        radius: shape.body.width() / 2.0,
                        color,
                    });
                } else {
                    out.push(DrawCommand::Rect {
                        pos: shape.body.pos,
                        size: shape.body.size(),
                        color,
                    });
                }
            }
        }
    }

    for drop in &game.rain.drops {
        out.push(DrawCommand::Line {
            from: drop.body.pos,
            to: drop.body.pos + Vec2::new(0.0, drop.length),
            width: RAIN_DROP_WIDTH,
            color: colors::RAIN,
        });
    }

    for ball in &game.gravity.balls {
        let center = ball.body.center();
        let mut glow = colors::GRAVITY_GLOW;
        glow[3] = glow[3].min(ball.alpha());
        out.push(DrawCommand::Circle {
            center,
            radius: ball.attraction_radius,
            color: glow,
        });
        out.push(DrawCommand::Circle {
            center,
            radius: ball.radius,
            color: colors::GRAVITY_BALL,
        });
    }

    match game.phase {
        GamePhase::GameOver => push_game_over(game, &mut out),
        GamePhase::Paused => {
            push_hud(game, &mut out);
            out.push(DrawCommand::Text {
                pos: game.config().bounds.center(),
                text: "PAUSED".to_string(),
                size: 48.0,
                align: TextAlign::Center,
                color: colors::TEXT,
            });
        }
        GamePhase::Playing => push_hud(game, &mut out),
    }

    out
}

fn push_portal(game: &Game, out: &mut Vec<DrawCommand>) {
    let portal = &game.level.portal;
    let center = portal.body.center();

    out.push(DrawCommand::Circle {
        center,
        radius: portal.body.width().min(portal.body.height()) / 2.0 + PORTAL_GLOW_PAD,
        color: colors::rgb(portal.color, PORTAL_GLOW_ALPHA),
    });

    // Positive rotation turns counter-clockwise on screen
    let turn = Vec2::from_angle(-portal.rotation.to_radians());
    let points: Vec<Vec2> = portal
        .spiral_points()
        .map(|p| center + turn.rotate(p - center))
        .collect();
    let n = points.len() as f32;
    for (i, seg) in points.windows(2).enumerate() {
        let intensity = (i + 1) as f32 / n;
        let [r, g, b, _] = colors::rgb(portal.color, 1.0);
        out.push(DrawCommand::Line {
            from: seg[0],
            to: seg[1],
            width: PORTAL_LINE_WIDTH,
            color: [r, g * intensity, b * intensity, 1.0],
        });
    }
}

fn push_hud(game: &Game, out: &mut Vec<DrawCommand>) {
    let bounds = game.config().bounds;
    out.push(DrawCommand::Text {
        pos: Vec2::new(bounds.width - HUD_MARGIN, HUD_MARGIN),
        text: format!("{}-{}", game.level.world_number, game.level.level_number),
        size: 24.0,
        align: TextAlign::TopRight,
        color: colors::TEXT,
    });

    let Some(player) = game.level.player() else {
        return;
    };
    let bar_pos = Vec2::new(bounds.width - HUD_MARGIN - HEALTH_BAR_SIZE.x, HEALTH_BAR_Y);
    let fraction = (player.health as f32 / PLAYER_MAX_HEALTH as f32).clamp(0.0, 1.0);
    let color = if fraction > 0.6 {
        colors::HEALTH_HIGH
    } else if fraction > 0.3 {
        colors::HEALTH_MID
    } else {
        colors::HEALTH_LOW
    };

    out.push(DrawCommand::Rect {
        pos: bar_pos,
        size: HEALTH_BAR_SIZE,
        color: colors::HEALTH_BAR_BACK,
    });
    out.push(DrawCommand::Rect {
        pos: bar_pos,
        size: Vec2::new((HEALTH_BAR_SIZE.x * fraction).floor(), HEALTH_BAR_SIZE.y),
        color,
    });
    out.push(DrawCommand::Text {
        pos: bar_pos + HEALTH_BAR_SIZE / 2.0,
        text: format!("HP: {}/{}", player.health, PLAYER_MAX_HEALTH),
        size: 16.0,
        align: TextAlign::Center,
        color: colors::TEXT,
    });
}

fn push_game_over(game: &Game, out: &mut Vec<DrawCommand>) {
    let bounds = game.config().bounds;
    let center = bounds.center();
    out.push(DrawCommand::Rect {
        pos: Vec2::ZERO,
        size: Vec2::new(bounds.width, bounds.height),
        color: colors::OVERLAY,
    });
    out.push(DrawCommand::Text {
        pos: center - Vec2::new(0.0, 50.0),
        text: "GAME OVER".to_string(),
        size: 64.0,
        align: TextAlign::Center,
        color: colors::GAME_OVER_TEXT,
    });
    out.push(DrawCommand::Text {
        pos: center + Vec2::new(0.0, 30.0),
        text: format!(
            "Reached {}-{}. Press R to restart",
            game.level.world_number, game.level.level_number
        ),
        size: 24.0,
        align: TextAlign::Center,
        color: colors::TEXT,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioManager;
    use crate::sim::{GameConfig, TickInput};

    fn game() -> Game {
        Game::new(GameConfig {
            seed: 3,
            ..Default::default()
        })
    }

    fn texts(commands: &[DrawCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_scene_starts_with_clear_and_shows_level() {
        let scene = extract_scene(&game());
        assert_eq!(scene[0], DrawCommand::Clear(colors::BACKGROUND));
        let labels = texts(&scene);
        assert!(labels.contains(&"1-1"));
        assert!(labels.contains(&"HP: 100/100"));
    }

    #[test]
    fn test_every_object_is_drawn() {
        let game = game();
        let scene = extract_scene(&game);
        let polygons = scene
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count();
        // Player plus two bats
        assert_eq!(polygons, 1 + game.level.bats().count());
    }

    #[test]
    fn test_rain_and_gravity_glow() {
        let mut game = game();
        let mut audio = AudioManager::silent();
        let click = TickInput {
            click: Some(Vec2::new(400.0, 200.0)),
            ..Default::default()
        };
        game.tick(&click, 1.0 / 60.0, &mut audio);
        for _ in 0..30 {
            game.tick(&TickInput::default(), 1.0 / 60.0, &mut audio);
        }
        let scene = extract_scene(&game);

        let rain_lines = scene
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { color, .. } if *color == colors::RAIN))
            .count();
        assert_eq!(rain_lines, game.rain.drops.len());

        let ball = &game.gravity.balls[0];
        let glow = scene.iter().find_map(|c| match c {
            DrawCommand::Circle { radius, color, .. } if *radius == ball.attraction_radius => {
                Some(color[3])
            }
            _ => None,
        });
        assert_eq!(glow, Some(colors::GRAVITY_GLOW[3].min(ball.alpha())));
    }

    #[test]
    fn test_game_over_overlay() {
        let mut game = game();
        if let Some(player) = game.level.player_mut() {
            player.take_damage(PLAYER_MAX_HEALTH);
        }
        game.tick(&TickInput::default(), 1.0 / 60.0, &mut AudioManager::silent());
        let scene = extract_scene(&game);
        assert!(texts(&scene).contains(&"GAME OVER"));
        assert!(!texts(&scene).iter().any(|t| t.starts_with("HP")));
    }

    #[test]
    fn test_portal_spiral_rotates_about_center() {
        let mut game = game();
        let before = extract_scene(&game);
        game.level.portal.rotation = 90.0;
        let after = extract_scene(&game);
        // Outermost end of the swirl
        let spiral_tip = |scene: &[DrawCommand]| {
            scene.iter().rev().find_map(|c| match c {
                DrawCommand::Line { to, width, .. } if *width == PORTAL_LINE_WIDTH => Some(*to),
                _ => None,
            })
        };
        let center = game.level.portal.body.center();
        let (a, b) = (spiral_tip(&before), spiral_tip(&after));
        assert!(a.is_some() && b.is_some());
        if let (Some(a), Some(b)) = (a, b) {
            assert!((a.distance(center) - b.distance(center)).abs() < 1e-3);
            assert!(a.distance(b) > 1e-3);
        }
    }
}
