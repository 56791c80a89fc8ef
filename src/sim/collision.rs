//! Collision detection for convex polygons and axis-aligned rects
//!
//! The precise test is the Separating Axis Theorem: two convex polygons are
//! disjoint iff some edge normal of either polygon separates their
//! projections. Concave input is not supported.

use glam::Vec2;

/// Axis-aligned bounding rect (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Overlap test; rects that merely share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Nearest point of the rect (boundary or interior) to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }
}

/// Which side of a rect a point is closest to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Nearest rect edge to `p` and the distance to it (negative when outside)
pub fn nearest_edge(rect: &Rect, p: Vec2) -> (Edge, f32) {
    let candidates = [
        (Edge::Left, p.x - rect.left()),
        (Edge::Right, rect.right() - p.x),
        (Edge::Top, p.y - rect.top()),
        (Edge::Bottom, rect.bottom() - p.y),
    ];
    candidates
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap_or((Edge::Top, 0.0))
}

/// Project a polygon onto an axis, returning (min, max)
fn project(polygon: &[Vec2], axis: Vec2) -> (f32, f32) {
    polygon
        .iter()
        .map(|p| p.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
}

/// Unit edge normals of a polygon, skipping zero-length edges
///
/// Polygons with fewer than three points also contribute their edge
/// directions, so segments are separated along their own length.
fn axes(polygon: &[Vec2], out: &mut Vec<Vec2>) {
    let n = polygon.len();
    for i in 0..n {
        let edge = polygon[(i + 1) % n] - polygon[i];
        let Some(dir) = edge.try_normalize() else {
            continue;
        };
        out.push(dir.perp());
        if n < 3 {
            out.push(dir);
        }
    }
}

/// SAT test for two convex polygons (world space)
pub fn polygons_collide(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let mut all_axes = Vec::with_capacity(a.len() + b.len());
    axes(a, &mut all_axes);
    axes(b, &mut all_axes);

    if all_axes.is_empty() {
        // Both are single points (or fully degenerate)
        return a[0].distance_squared(b[0]) <= f32::EPSILON;
    }

    for axis in all_axes {
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

/// Distance from `p` to the nearest point of `rect` (zero when inside)
pub fn distance_to_rect(rect: &Rect, p: Vec2) -> f32 {
    rect.closest_point(p).distance(p)
}
