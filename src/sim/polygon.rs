//! Convex polygon construction
//!
//! Polygons are plain point lists, implicitly closed (last point connects to
//! the first). Everything that reaches the SAT test must be convex, so
//! composite shapes go through [`combine_polygons`] first.

use glam::Vec2;

/// A polygon as an ordered list of points
pub type Polygon = Vec<Vec2>;

/// Rectangle corners, clockwise on screen starting at the top-left
pub fn create_rect_polygon(x: f32, y: f32, width: f32, height: f32) -> Polygon {
    vec![
        Vec2::new(x, y),
        Vec2::new(x + width, y),
        Vec2::new(x + width, y + height),
        Vec2::new(x, y + height),
    ]
}

/// Points along a circle or arc
///
/// Angles are in degrees (0 = right, 90 = down on screen). Returns `steps + 1`
/// points: the first at `start_deg`, the last at `end_deg`, so a full circle
/// repeats its first point at the end.
pub fn create_circle_polygon(
    center: Vec2,
    radius: f32,
    start_deg: f32,
    end_deg: f32,
    steps: usize,
) -> Polygon {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f32 / steps as f32;
            let angle = (start_deg + (end_deg - start_deg) * t).to_radians();
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Regular polygon approximating a circle, without the repeated closing point
pub fn regular_polygon(center: Vec2, radius: f32, points: usize) -> Polygon {
    let points = points.max(3);
    (0..points)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / points as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Regular polygon approximating an axis-aligned ellipse
pub fn ellipse_polygon(center: Vec2, radii: Vec2, points: usize) -> Polygon {
    let points = points.max(3);
    (0..points)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / points as f32;
            center + Vec2::new(angle.cos() * radii.x, angle.sin() * radii.y)
        })
        .collect()
}

/// Translate every point of a polygon
pub fn translate(polygon: &[Vec2], offset: Vec2) -> Polygon {
    polygon.iter().map(|&p| p + offset).collect()
}

/// Cross product of (b - a) and (c - a); positive for a left turn
#[inline]
pub fn turn(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Convex hull enclosing every point of every input polygon
///
/// Graham scan anchored at the lowest-then-leftmost point. Returns an empty
/// list for no input, a single polygon unchanged, and the raw point set when
/// fewer than three points are available.
pub fn combine_polygons(polygons: &[Polygon]) -> Polygon {
    match polygons {
        [] => return Vec::new(),
        [single] => return single.clone(),
        _ => {}
    }

    let all_points: Vec<Vec2> = polygons.iter().flatten().copied().collect();
    if all_points.len() < 3 {
        return all_points;
    }

    let start = all_points
        .iter()
        .copied()
        .reduce(|best, p| {
            if p.y < best.y || (p.y == best.y && p.x < best.x) {
                p
            } else {
                best
            }
        })
        .unwrap_or(Vec2::ZERO);

    let polar = |p: &Vec2| (p.y - start.y).atan2(p.x - start.x);

    let mut rest: Vec<Vec2> = all_points.into_iter().filter(|&p| p != start).collect();
    rest.sort_by(|a, b| {
        polar(a)
            .total_cmp(&polar(b))
            .then_with(|| start.distance_squared(*a).total_cmp(&start.distance_squared(*b)))
    });
    rest.dedup();

    let mut hull: Polygon = Vec::with_capacity(rest.len() + 1);
    hull.push(start);
    for p in rest {
        while hull.len() > 1 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    // Closing edge back to the anchor
    while hull.len() > 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], start) <= 0.0 {
        hull.pop();
    }
    hull
}

/// True when every consecutive triple turns the same way (collinear triples allowed)
pub fn is_convex(polygon: &[Vec2]) -> bool {
    let n = polygon.len();
    if n < 4 {
        return true;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let t = turn(polygon[i], polygon[(i + 1) % n], polygon[(i + 2) % n]);
        if t.abs() <= 1e-4 {
            continue;
        }
        if sign == 0.0 {
            sign = t.signum();
        } else if t.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_rect_polygon_corners() {
        let rect = create_rect_polygon(10.0, 20.0, 30.0, 40.0);
        assert_eq!(
            rect,
            vec![
                Vec2::new(10.0, 20.0),
                Vec2::new(40.0, 20.0),
                Vec2::new(40.0, 60.0),
                Vec2::new(10.0, 60.0),
            ]
        );
    }

    #[test]
    fn test_full_circle_closes_loop() {
        let c = Vec2::new(50.0, 50.0);
        let points = create_circle_polygon(c, 10.0, 0.0, 360.0, 16);
        assert_eq!(points.len(), 17);
        assert!(approx(points[0], points[16]));
        assert!(approx(points[0], c + Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn test_half_circle_arc_endpoints() {
        let c = Vec2::new(0.0, 0.0);
        let points = create_circle_polygon(c, 5.0, 0.0, 180.0, 8);
        assert_eq!(points.len(), 9);
        assert!(approx(points[0], Vec2::new(5.0, 0.0)));
        assert!(approx(points[8], Vec2::new(-5.0, 0.0)));
    }

    #[test]
    fn test_combine_empty_and_single() {
        assert!(combine_polygons(&[]).is_empty());
        let rect = create_rect_polygon(0.0, 0.0, 10.0, 10.0);
        assert_eq!(combine_polygons(&[rect.clone()]), rect);
    }

    #[test]
    fn test_combine_too_few_points() {
        let a = vec![Vec2::new(1.0, 1.0)];
        let b = vec![Vec2::new(2.0, 2.0)];
        assert_eq!(combine_polygons(&[a, b]), vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);
    }

    #[test]
    fn test_combine_two_rects_keeps_extremes() {
        let a = create_rect_polygon(0.0, 0.0, 10.0, 10.0);
        let b = create_rect_polygon(20.0, 5.0, 10.0, 10.0);
        let hull = combine_polygons(&[a, b]);

        for corner in [
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 5.0),
            Vec2::new(30.0, 15.0),
            Vec2::new(0.0, 10.0),
        ] {
            assert!(hull.contains(&corner), "missing {corner:?} in {hull:?}");
        }
        // Interior corner of the left rect is dropped
        assert!(!hull.contains(&Vec2::new(10.0, 10.0)));
        assert!(is_convex(&hull));
    }

    #[test]
    fn test_combine_drops_collinear_and_duplicates() {
        let a = create_rect_polygon(0.0, 0.0, 10.0, 10.0);
        let b = create_rect_polygon(0.0, 0.0, 10.0, 10.0);
        let c = vec![Vec2::new(5.0, 0.0), Vec2::new(0.0, 5.0)];
        let hull = combine_polygons(&[a, b, c]);
        assert_eq!(hull.len(), 4);
        assert!(is_convex(&hull));
    }

    #[test]
    fn test_ellipse_polygon_extents() {
        let e = ellipse_polygon(Vec2::ZERO, Vec2::new(20.0, 10.0), 12);
        let max_x = e.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let max_y = e.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((max_x - 20.0).abs() < 1e-3);
        assert!((max_y - 10.0).abs() < 1e-3);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn point() -> impl Strategy<Value = Vec2> {
            (-200.0f32..200.0, -200.0f32..200.0).prop_map(|(x, y)| Vec2::new(x, y))
        }

        proptest! {
            #[test]
            fn hull_is_convex_and_encloses_inputs(
                a in prop::collection::vec(point(), 3..12),
                b in prop::collection::vec(point(), 3..12),
            ) {
                let hull = combine_polygons(&[a.clone(), b.clone()]);
                prop_assert!(is_convex(&hull));
                // Every input point lies on or inside the hull
                let n = hull.len();
                if n >= 3 {
                    for p in a.iter().chain(b.iter()) {
                        for i in 0..n {
                            let t = turn(hull[i], hull[(i + 1) % n], *p);
                            prop_assert!(t >= -1e-1, "point {:?} outside hull edge {}", p, i);
                        }
                    }
                }
            }
        }
    }
}
