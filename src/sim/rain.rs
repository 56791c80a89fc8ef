//! Rain particle system
//!
//! Drops fall under gravity, wind and quadratic air drag. A drop that lands
//! on a solid body ties itself to it and rides along until it slides off the
//! bottom; while embedded it is damped hard and pushed toward the nearest edge
//! of every body it overlaps.
//!
//! Accelerations here are per-second values tuned at [`REFERENCE_FPS`].

use glam::Vec2;
use rand::Rng;

use super::body::{Attractable, Body, EntityId};
use super::collision::{Edge, nearest_edge};
use crate::ScreenBounds;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct RainDrop {
    pub body: Body,
    pub length: f32,
    /// Body this drop is resting on
    tied_to: Option<EntityId>,
    /// Anchor position last frame, for displacement tracking
    tied_last_pos: Option<Vec2>,
    /// Bodies overlapped this frame
    colliding: Vec<EntityId>,
    wind_acceleration: Vec2,
}

impl RainDrop {
    pub fn new<R: Rng + ?Sized>(pos: Vec2, wind: f32, rng: &mut R) -> Self {
        Self::with_length(pos, wind, rng.random_range(RAIN_MIN_LENGTH..=RAIN_MAX_LENGTH))
    }

    pub fn with_length(pos: Vec2, wind: f32, length: f32) -> Self {
        let mut body = Body::new(pos, RAIN_DROP_WIDTH, length);
        body.vel = Vec2::new(wind, RAIN_DEFAULT_VELOCITY_Y);
        Self {
            body,
            length,
            tied_to: None,
            tied_last_pos: None,
            colliding: Vec::new(),
            wind_acceleration: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn tied_to(&self) -> Option<EntityId> {
        self.tied_to
    }

    #[inline]
    pub fn is_colliding(&self) -> bool {
        !self.colliding.is_empty()
    }

    pub fn set_wind_acceleration(&mut self, wind: f32) {
        self.wind_acceleration = Vec2::new(wind, 0.0);
    }

    /// One frame: ride the anchor, refresh overlaps, then integrate
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, solids: &[&Body], rng: &mut R) {
        if dt <= 0.0 {
            return;
        }
        self.follow_anchor(solids, rng);
        self.refresh_collisions(solids, rng);

        if self.colliding.is_empty() {
            self.apply_drag(RAIN_AIR_FRICTION, dt);
            let jitter = Vec2::new(
                rng.random_range(-RAIN_JITTER..=RAIN_JITTER),
                rng.random_range(-RAIN_JITTER..=RAIN_JITTER),
            );
            let acc = Vec2::new(0.0, RAIN_GRAVITY) + self.wind_acceleration + jitter;
            self.body.vel += acc * dt;
        } else {
            self.apply_drag(RAIN_COLLISION_FRICTION, dt);
            let mut acc = Vec2::ZERO;
            for solid in solids.iter().filter(|s| self.colliding.contains(&s.id)) {
                acc += self.repulsion_from(solid, rng);
            }
            self.body.vel += acc * dt;
        }

        self.limit_speed();
        self.body.pos += self.body.vel * dt;
        self.body.acc = Vec2::ZERO;
    }

    /// Shift with the anchor and keep within its footprint
    fn follow_anchor<R: Rng + ?Sized>(&mut self, solids: &[&Body], rng: &mut R) {
        let Some(anchor_id) = self.tied_to else {
            return;
        };
        let Some(anchor) = solids.iter().find(|s| s.id == anchor_id) else {
            // Anchor is gone
            self.untie(rng);
            return;
        };

        if let Some(last) = self.tied_last_pos {
            self.body.pos += anchor.pos - last;
        }
        self.tied_last_pos = Some(anchor.pos);

        let rect = anchor.rect();
        let max_x = (rect.right() - self.body.width()).max(rect.left());
        let clamped = self.body.pos.x.clamp(rect.left(), max_x);
        if clamped != self.body.pos.x {
            self.body.pos.x = clamped;
            self.body.vel.y = self.body.vel.y.max(RAIN_SIDE_MIN_FALL_SPEED);
        }

        if self.body.pos.y > rect.bottom() {
            self.untie(rng);
        }
    }

    /// Recompute the overlap set and tie to or untie from an anchor
    pub fn refresh_collisions<R: Rng + ?Sized>(&mut self, solids: &[&Body], rng: &mut R) {
        self.colliding.clear();
        for solid in solids {
            if solid.id != self.body.id && self.body.collides_with(solid) {
                self.colliding.push(solid.id);
            }
        }

        match self.tied_to {
            None => {
                if let Some(first) = self.colliding.first().copied() {
                    let anchor_pos = solids.iter().find(|s| s.id == first).map(|s| s.pos);
                    self.tie(first, anchor_pos);
                }
            }
            Some(anchor) if !self.colliding.contains(&anchor) => self.untie(rng),
            Some(_) => {}
        }
    }

    fn tie(&mut self, anchor: EntityId, anchor_pos: Option<Vec2>) {
        self.tied_to = Some(anchor);
        self.tied_last_pos = anchor_pos;
        self.body.vel *= RAIN_TIE_VELOCITY_SCALE;
    }

    fn untie<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tied_to = None;
        self.tied_last_pos = None;
        self.body.vel = Vec2::new(rng.random_range(-20.0..=20.0), rng.random_range(50.0..=100.0));
    }

    /// Quadratic drag, never strong enough to reverse the velocity
    fn apply_drag(&mut self, coefficient: f32, dt: f32) {
        let speed = self.body.vel.length();
        if speed <= 0.0 {
            return;
        }
        let loss = (coefficient * speed * speed * dt).min(speed);
        self.body.vel -= self.body.vel / speed * loss;
    }

    /// Push toward the nearest edge of `solid`, harder the deeper the drop sits
    fn repulsion_from<R: Rng + ?Sized>(&self, solid: &Body, rng: &mut R) -> Vec2 {
        let (edge, distance) = nearest_edge(&solid.rect(), self.body.pos);
        let depth = distance.max(1.0);
        let strength = RAIN_REPULSION_FORCE * (1.0 + depth * RAIN_DEPTH_REPULSION_MULTIPLIER);

        let dir = match edge {
            Edge::Left => Vec2::new(-1.0, RAIN_SIDE_DOWNWARD_BIAS),
            Edge::Right => Vec2::new(1.0, RAIN_SIDE_DOWNWARD_BIAS),
            Edge::Top => Vec2::new(rng.random_range(-RAIN_TOP_SPREAD..=RAIN_TOP_SPREAD), -1.0),
            Edge::Bottom => Vec2::Y,
        };
        dir.normalize_or_zero() * strength
    }

    /// Falling drops may move faster than anything bouncing back up
    fn limit_speed(&mut self) {
        let cap = if self.body.vel.y < 0.0 {
            RAIN_MAX_UPWARD_VELOCITY
        } else {
            RAIN_MAX_VELOCITY
        };
        self.body.vel = self.body.vel.clamp_length_max(cap);
    }
}

impl Attractable for RainDrop {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn tied_anchor(&self) -> Option<EntityId> {
        self.tied_to
    }
}

/// Spawns, steers and culls every raindrop
#[derive(Debug, Clone)]
pub struct RainSystem {
    pub drops: Vec<RainDrop>,
    /// Drops per second
    pub spawn_rate: f32,
    spawn_timer: f32,
    pub wind: f32,
    pub target_wind: f32,
    wind_timer: f32,
    max_drops: usize,
    bounds: ScreenBounds,
}

impl RainSystem {
    pub fn new(bounds: ScreenBounds, max_drops: usize) -> Self {
        Self {
            drops: Vec::new(),
            spawn_rate: RAIN_SPAWN_RATE,
            spawn_timer: 0.0,
            wind: 0.0,
            target_wind: 0.0,
            wind_timer: 0.0,
            max_drops,
            bounds,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, solids: &[&Body], rng: &mut R) {
        if dt <= 0.0 {
            return;
        }
        self.update_wind(dt, rng);

        if self.spawn_rate > 0.0 {
            let interval = 1.0 / self.spawn_rate;
            self.spawn_timer += dt;
            let due = (self.spawn_timer / interval).floor();
            self.spawn_timer %= interval;
            let room = self.max_drops.saturating_sub(self.drops.len());
            for _ in 0..(due as usize).min(room) {
                self.spawn_drop(rng);
            }
        }

        for drop in &mut self.drops {
            drop.set_wind_acceleration(self.wind);
            drop.update(dt, solids, rng);
        }

        // Sideways drift is allowed; only the bottom edge culls
        let height = self.bounds.height;
        self.drops
            .retain(|d| !d.body.marked_for_removal && d.body.pos.y <= height);
    }

    fn update_wind<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.wind_timer += dt;
        if self.wind_timer >= WIND_CHANGE_INTERVAL {
            self.wind_timer = 0.0;
            self.target_wind = rng.random_range(WIND_MIN..=WIND_MAX);
        }
        self.wind += (self.target_wind - self.wind) * (WIND_CHANGE_SPEED * dt).min(1.0);
    }

    pub fn spawn_drop<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let x = rng.random_range(-RAIN_SPAWN_MARGIN..=self.bounds.width + RAIN_SPAWN_MARGIN);
        let y = rng.random_range(-RAIN_SPAWN_MARGIN..=0.0);
        self.drops.push(RainDrop::new(Vec2::new(x, y), self.wind, rng));
    }

    /// Set wind immediately and rewrite every drop's horizontal speed
    pub fn set_wind_force(&mut self, force: f32) {
        self.wind = force;
        self.target_wind = force;
        for drop in &mut self.drops {
            drop.body.vel.x = force;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(9)
    }

    #[test]
    fn test_free_drop_accelerates_down() {
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 5.0);
        drop.update(DT, &[], &mut rng());
        assert!(drop.body.vel.y > RAIN_DEFAULT_VELOCITY_Y);
        assert!(drop.body.pos.y > 100.0);
        assert!(drop.tied_to().is_none());
    }

    #[test]
    fn test_terminal_velocity_caps() {
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 0.0), 0.0, 5.0);
        let mut r = rng();
        for _ in 0..300 {
            drop.update(DT, &[], &mut r);
            assert!(drop.body.vel.length() <= RAIN_MAX_VELOCITY + 1e-3);
        }

        drop.body.vel = Vec2::new(0.0, -1000.0);
        drop.limit_speed();
        assert!((drop.body.vel.length() - RAIN_MAX_UPWARD_VELOCITY).abs() < 1e-3);
    }

    #[test]
    fn test_drop_on_body_ties_and_never_pushes_down() {
        let solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        let incoming = drop.body.vel.y;

        drop.update(DT, &[&solid], &mut rng());

        assert_eq!(drop.tied_to(), Some(solid.id));
        assert!(drop.is_colliding());
        assert!(drop.body.vel.y <= 0.0, "vel {:?}", drop.body.vel);
        assert!(drop.body.vel.y < incoming);
    }

    #[test]
    fn test_tied_drop_rides_anchor() {
        let mut solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        let mut r = rng();
        drop.update(DT, &[&solid], &mut r);
        let before = drop.body.pos;

        solid.pos += Vec2::new(5.0, -3.0);
        drop.update(DT, &[&solid], &mut r);

        let moved = drop.body.pos - before;
        assert!((moved.x - 5.0).abs() < 0.5, "moved {moved:?}");
        assert!((moved.y + 3.0).abs() < 0.5, "moved {moved:?}");
        assert_eq!(drop.tied_to(), Some(solid.id));
    }

    #[test]
    fn test_unties_when_anchor_leaves() {
        let mut solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        let mut r = rng();
        drop.update(DT, &[&solid], &mut r);
        assert!(drop.tied_to().is_some());

        // Removed anchor
        drop.update(DT, &[], &mut r);
        assert!(drop.tied_to().is_none());
        assert!(!drop.is_colliding());

        // Anchor that teleports away
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        drop.update(DT, &[&solid], &mut r);
        solid.pos = Vec2::new(500.0, 500.0);
        drop.refresh_collisions(&[&solid], &mut r);
        assert!(drop.tied_to().is_none());
        assert!(drop.body.vel.y >= 50.0);
    }

    #[test]
    fn test_tied_drop_is_clamped_to_anchor_footprint() {
        let solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        let mut r = rng();
        drop.update(DT, &[&solid], &mut r);
        assert_eq!(drop.tied_to(), Some(solid.id));

        drop.body.pos.x = 50.0;
        drop.body.vel.y = 0.0;
        drop.follow_anchor(&[&solid], &mut r);
        assert_eq!(drop.body.pos.x, 90.0);
        assert!(drop.body.vel.y >= RAIN_SIDE_MIN_FALL_SPEED);
        assert_eq!(drop.tied_to(), Some(solid.id));

        drop.body.pos.x = 200.0;
        drop.body.vel.y = -10.0;
        drop.follow_anchor(&[&solid], &mut r);
        assert_eq!(drop.body.pos.x, 110.0 - RAIN_DROP_WIDTH);
        assert!(drop.body.vel.y >= RAIN_SIDE_MIN_FALL_SPEED);
    }

    #[test]
    fn test_drop_detaches_below_anchor_with_kick() {
        let solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let mut drop = RainDrop::with_length(Vec2::new(100.0, 100.0), 0.0, 6.0);
        let mut r = rng();
        drop.update(DT, &[&solid], &mut r);
        assert_eq!(drop.tied_to(), Some(solid.id));

        drop.body.pos.y = 130.0;
        drop.follow_anchor(&[&solid], &mut r);
        assert!(drop.tied_to().is_none());
        assert!((-20.0..=20.0).contains(&drop.body.vel.x), "vel {:?}", drop.body.vel);
        assert!((50.0..=100.0).contains(&drop.body.vel.y), "vel {:?}", drop.body.vel);
    }

    #[test]
    fn test_side_repulsion_points_out_and_down() {
        let solid = Body::new(Vec2::new(90.0, 105.0), 20.0, 20.0);
        let drop = RainDrop::with_length(Vec2::new(92.0, 112.0), 0.0, 6.0);
        let force = drop.repulsion_from(&solid, &mut rng());
        assert!(force.x < 0.0);
        assert!(force.y > 0.0);
        assert!(force.y > force.x.abs());
    }

    #[test]
    fn test_repulsion_grows_with_depth() {
        let solid = Body::new(Vec2::new(0.0, 0.0), 100.0, 100.0);
        let shallow = RainDrop::with_length(Vec2::new(3.0, 50.0), 0.0, 5.0);
        let deep = RainDrop::with_length(Vec2::new(20.0, 50.0), 0.0, 5.0);
        let mut r = rng();
        assert!(deep.repulsion_from(&solid, &mut r).length() > shallow.repulsion_from(&solid, &mut r).length());
    }

    #[test]
    fn test_drag_never_reverses() {
        let mut drop = RainDrop::with_length(Vec2::ZERO, 0.0, 5.0);
        drop.body.vel = Vec2::new(0.0, 300.0);
        drop.apply_drag(RAIN_COLLISION_FRICTION, 1.0);
        assert_eq!(drop.body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_wind_changes_after_interval() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        rain.update(WIND_CHANGE_INTERVAL + 0.1, &[], &mut rng());
        assert!(rain.target_wind >= WIND_MIN && rain.target_wind <= WIND_MAX);
        assert_ne!(rain.target_wind, 0.0);
        assert_ne!(rain.wind, 0.0);
    }

    #[test]
    fn test_wind_approaches_target_gradually() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        rain.target_wind = 10.0;
        rain.update(0.1, &[], &mut rng());
        assert!(rain.wind > 0.0);
        assert!(rain.wind < 10.0);
    }

    #[test]
    fn test_spawn_rate_and_cap() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        rain.update(1.0, &[], &mut rng());
        assert!((69..=70).contains(&rain.drops.len()), "{}", rain.drops.len());

        let mut capped = RainSystem::new(ScreenBounds::default(), 5);
        capped.update(1.0, &[], &mut rng());
        assert_eq!(capped.drops.len(), 5);
    }

    #[test]
    fn test_huge_dt_spawns_up_to_cap_and_returns() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 10);
        let mut r = rng();
        rain.update(1.0e6, &[], &mut r);
        assert!(rain.drops.len() <= 10);
        assert!(rain.spawn_timer < 1.0 / RAIN_SPAWN_RATE);
        assert!((WIND_MIN..=WIND_MAX).contains(&rain.wind));

        let mut full = RainSystem::new(ScreenBounds::default(), 0);
        full.update(1.0e6, &[], &mut r);
        assert!(full.drops.is_empty());
    }

    #[test]
    fn test_only_bottom_edge_culls() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        rain.spawn_rate = 0.0;
        rain.drops.push(RainDrop::with_length(Vec2::new(100.0, 700.0), 0.0, 5.0));
        rain.drops.push(RainDrop::with_length(Vec2::new(-100.0, 300.0), 0.0, 5.0));
        rain.update(DT, &[], &mut rng());
        assert_eq!(rain.drops.len(), 1);
        assert!(rain.drops[0].body.pos.x < 0.0);
    }

    #[test]
    fn test_set_wind_force_rewrites_drops() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        let mut r = rng();
        rain.spawn_drop(&mut r);
        rain.spawn_drop(&mut r);
        rain.set_wind_force(7.0);
        assert_eq!(rain.wind, 7.0);
        assert!(rain.drops.iter().all(|d| d.body.vel.x == 7.0));
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut rain = RainSystem::new(ScreenBounds::default(), 1000);
        rain.update(0.0, &[], &mut rng());
        assert!(rain.drops.is_empty());
        assert_eq!(rain.wind, 0.0);
    }
}
