//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (every stochastic update takes an injected `Rng`)
//! - Stable iteration order (insertion order of the owning containers)
//! - No rendering, audio or platform dependencies beyond the sink traits

pub mod bat;
pub mod body;
pub mod collision;
pub mod game;
pub mod gravity;
pub mod level;
pub mod player;
pub mod polygon;
pub mod portal;
pub mod projectile;
pub mod rain;
pub mod shapes;

pub use bat::Bat;
pub use body::{Attractable, Body, EntityId};
pub use collision::{Edge, Rect, nearest_edge, polygons_collide};
pub use game::{Game, GameConfig, GamePhase, TickInput};
pub use gravity::{GravityBall, GravityBallSystem};
pub use level::{Level, Object, PlayerFactory};
pub use player::{MoveKeys, Player};
pub use polygon::{Polygon, combine_polygons, create_circle_polygon, create_rect_polygon};
pub use portal::Portal;
pub use projectile::Projectile;
pub use rain::{RainDrop, RainSystem};
pub use shapes::{Shape, ShapeKind};
