//! Level orchestration
//!
//! A [`Level`] owns every live entity except rain and gravity wells. Each
//! frame, after the entities have moved, [`Level::update`] resolves
//! cross-entity collisions in a fixed order:
//!
//! 1. enemies try to attack
//! 2. enemy projectiles are gathered into one transient list
//! 3. enemies outside their immunity window are hit by other enemies' shots
//! 4. players are hit by any shot
//! 5. environmental bodies bounce off players, enemies, shots and each other
//! 6. dead enemies leave the roster and the portal follows the kill progress
//!
//! Later passes skip anything an earlier pass already marked for removal.

use glam::Vec2;
use rand::Rng;

use super::bat::Bat;
use super::body::{Attractable, Body, EntityId};
use super::player::Player;
use super::portal::Portal;
use super::projectile::Projectile;
use super::shapes::{Shape, ShapeKind};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::{ScreenBounds, random_unit_vector};

/// Builds the player when a level needs one
pub type PlayerFactory = fn(Vec2, ScreenBounds) -> Player;

/// Every kind of entity a level can own
#[derive(Debug, Clone)]
pub enum Object {
    Player(Player),
    Bat(Bat),
    Shape(Shape),
}

impl Object {
    pub fn body(&self) -> &Body {
        match self {
            Object::Player(p) => &p.body,
            Object::Bat(b) => &b.body,
            Object::Shape(s) => &s.body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Body {
        match self {
            Object::Player(p) => &mut p.body,
            Object::Bat(b) => &mut b.body,
            Object::Shape(s) => &mut s.body,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.body().id
    }

    #[inline]
    pub fn is_enemy(&self) -> bool {
        matches!(self, Object::Bat(_))
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        match self {
            Object::Player(p) => p.update(dt),
            Object::Bat(b) => b.update(dt, rng),
            Object::Shape(s) => s.update(dt),
        }
    }
}

/// Mutable borrows of two distinct objects
fn pair_mut(objects: &mut [Object], a: usize, b: usize) -> (&mut Object, &mut Object) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = objects.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = objects.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Location of a projectile inside its owning bat
type ShotRef = (usize, usize);

#[derive(Debug, Clone)]
pub struct Level {
    pub world_number: u32,
    pub level_number: u32,
    pub levels_per_world: u32,
    pub objects: Vec<Object>,
    /// Live enemy IDs, a subset of `objects`
    pub enemies: Vec<EntityId>,
    /// Live player IDs, a subset of `objects`
    pub players: Vec<EntityId>,
    pub portal: Portal,
    initial_enemy_count: usize,
    bounds: ScreenBounds,
    player_factory: PlayerFactory,
}

impl Level {
    pub fn new<R: Rng + ?Sized>(
        world_number: u32,
        level_number: u32,
        bounds: ScreenBounds,
        player_factory: PlayerFactory,
        rng: &mut R,
    ) -> Self {
        let mut level = Self {
            world_number,
            level_number,
            levels_per_world: LEVELS_PER_WORLD,
            objects: Vec::new(),
            enemies: Vec::new(),
            players: Vec::new(),
            portal: Portal::new(Self::portal_position(bounds)),
            initial_enemy_count: 0,
            bounds,
            player_factory,
        };
        level.setup_level(rng);
        level
    }

    #[inline]
    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    #[inline]
    pub fn initial_enemy_count(&self) -> usize {
        self.initial_enemy_count
    }

    fn portal_position(bounds: ScreenBounds) -> Vec2 {
        Vec2::new(
            bounds.width / 2.0 - PORTAL_SIZE / 2.0,
            bounds.height - PORTAL_BOTTOM_OFFSET,
        )
    }

    fn player_spawn(&self) -> Vec2 {
        self.bounds.center() - Vec2::splat(PLAYER_SIZE / 2.0)
    }

    /// Place the portal, the player and this level's population
    fn setup_level<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.portal = Portal::new(Self::portal_position(self.bounds));

        let spawn = self.player_spawn();
        let existing = self.objects.iter_mut().find_map(|o| match o {
            Object::Player(p) => Some(p),
            _ => None,
        });
        match existing {
            Some(player) => {
                player.body.set_position(spawn);
                player.body.vel = Vec2::ZERO;
                player.body.acc = Vec2::ZERO;
            }
            None => {
                let player = (self.player_factory)(spawn, self.bounds);
                self.add_object(Object::Player(player));
            }
        }

        if self.world_number == 1 && self.level_number == 1 {
            self.populate_first_level(rng);
        } else {
            self.populate_level(rng);
        }

        self.rebuild_rosters();
        self.initial_enemy_count = self.enemies.len();
        if self.initial_enemy_count == 0 {
            self.portal.enable();
        }
        log::info!(
            "level {}-{}: {} enemies, {} objects",
            self.world_number,
            self.level_number,
            self.initial_enemy_count,
            self.objects.len()
        );
    }

    /// Hand-placed opener: two static balls, a falling square and two bats
    fn populate_first_level<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (w, h) = (self.bounds.width, self.bounds.height);
        let ball = CIRCLE_RADIUS * 2.0;
        let band_y = h * 0.55;

        self.add_shape(ShapeKind::BlueBall, Vec2::new(w * 0.2 - ball / 2.0, band_y));
        self.add_shape(ShapeKind::BlueBall, Vec2::new(w * 0.8 - ball / 2.0, band_y));
        self.add_shape(ShapeKind::OrangeSquare, Vec2::new(w * 0.3, BAT_SPAWN_Y + 50.0));

        for fraction in [0.25, 0.75] {
            let jitter = rng.random_range(-20.0..=20.0);
            let x = (w * fraction - BAT_WIDTH / 2.0 + jitter).clamp(0.0, (w - BAT_WIDTH).max(0.0));
            self.add_bat(Vec2::new(x, BAT_SPAWN_Y), rng);
        }
    }

    /// `min(level, 3)` bats across the top plus one roaming shape
    fn populate_level<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let w = self.bounds.width;
        let bats = self.level_number.clamp(1, MAX_BATS_PER_LEVEL);
        for i in 0..bats {
            let x = w * (i + 1) as f32 / (bats + 1) as f32 - BAT_WIDTH / 2.0;
            self.add_bat(Vec2::new(x, BAT_SPAWN_Y), rng);
        }

        let kind = if rng.random_bool(0.5) {
            ShapeKind::Circle
        } else {
            ShapeKind::Square
        };
        let size = SQUARE_SIZE.max(CIRCLE_RADIUS * 2.0);
        let min_y = BAT_SPAWN_Y + BAT_HEIGHT + 10.0;
        let max_y = (self.bounds.height / 2.0 - PLAYER_SIZE / 2.0 - size - 10.0).max(min_y);
        let max_x = (w - 50.0 - size).max(50.0);
        let pos = Vec2::new(rng.random_range(50.0..=max_x), rng.random_range(min_y..=max_y));

        let mut shape = Shape::new(kind, pos, self.bounds);
        if self.world_number >= SHAPE_MOMENTUM_START_WORLD {
            shape.body.vel = random_unit_vector(rng) * SHAPE_MOMENTUM_PER_WORLD * self.world_number as f32;
        }
        self.add_object(Object::Shape(shape));
    }

    fn add_shape(&mut self, kind: ShapeKind, pos: Vec2) {
        self.add_object(Object::Shape(Shape::new(kind, pos, self.bounds)));
    }

    fn add_bat<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        let bat = Bat::new(pos, self.bounds, rng);
        log::debug!("spawned bat {} at ({:.0}, {:.0})", bat.body.id, pos.x, pos.y);
        self.add_object(Object::Bat(bat));
    }

    pub fn add_object(&mut self, object: Object) {
        match &object {
            Object::Player(p) => self.players.push(p.body.id),
            Object::Bat(b) => self.enemies.push(b.body.id),
            Object::Shape(_) => {}
        }
        self.objects.push(object);
    }

    fn rebuild_rosters(&mut self) {
        self.enemies = self.objects.iter().filter(|o| o.is_enemy()).map(Object::id).collect();
        self.players = self
            .objects
            .iter()
            .filter(|o| matches!(o, Object::Player(_)))
            .map(Object::id)
            .collect();
    }

    pub fn find(&self, id: EntityId) -> Option<&Object> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn player(&self) -> Option<&Player> {
        self.objects.iter().find_map(|o| match o {
            Object::Player(p) => Some(p),
            _ => None,
        })
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.objects.iter_mut().find_map(|o| match o {
            Object::Player(p) => Some(p),
            _ => None,
        })
    }

    pub fn bats(&self) -> impl Iterator<Item = &Bat> {
        self.objects.iter().filter_map(|o| match o {
            Object::Bat(b) => Some(b),
            _ => None,
        })
    }

    /// Move every owned entity and animate the portal
    pub fn update_objects<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for object in &mut self.objects {
            object.update(dt, rng);
        }
        self.portal.update(dt);
    }

    /// Bodies rain collides with
    pub fn solid_bodies(&self) -> Vec<&Body> {
        self.objects
            .iter()
            .map(Object::body)
            .filter(|b| !b.marked_for_removal)
            .collect()
    }

    /// Non-enemy bodies and every enemy shot, for gravity wells
    pub fn attractables_mut(&mut self) -> Vec<&mut dyn Attractable> {
        let mut out: Vec<&mut dyn Attractable> = Vec::new();
        for object in &mut self.objects {
            match object {
                Object::Player(p) => out.push(p),
                Object::Shape(s) => out.push(s),
                Object::Bat(b) => out.extend(
                    b.projectiles
                        .iter_mut()
                        .map(|p| p as &mut dyn Attractable),
                ),
            }
        }
        out
    }

    /// An enabled portal is touching a player
    pub fn player_at_portal(&self) -> bool {
        self.portal.enabled
            && self.objects.iter().any(|o| match o {
                Object::Player(p) => !p.body.marked_for_removal && self.portal.collides_with(&p.body),
                _ => false,
            })
    }

    fn projectile(&self, (obj, idx): ShotRef) -> Option<&Projectile> {
        match self.objects.get(obj) {
            Some(Object::Bat(b)) => b.projectiles.get(idx),
            _ => None,
        }
    }

    fn projectile_mut(&mut self, (obj, idx): ShotRef) -> Option<&mut Projectile> {
        match self.objects.get_mut(obj) {
            Some(Object::Bat(b)) => b.projectiles.get_mut(idx),
            _ => None,
        }
    }

    fn mark_projectile(&mut self, shot: ShotRef) {
        if let Some(p) = self.projectile_mut(shot) {
            p.body.marked_for_removal = true;
        }
    }

    fn live_shot_colliding(&self, shots: &[ShotRef], body: &Body, skip_owner: Option<usize>) -> Option<ShotRef> {
        shots.iter().copied().find(|&shot| {
            skip_owner != Some(shot.0)
                && self
                    .projectile(shot)
                    .is_some_and(|p| !p.body.marked_for_removal && body.collides_with(&p.body))
        })
    }

    /// Cross-entity collision resolution and portal bookkeeping
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, audio: &mut dyn AudioSink) {
        // 1. attacks
        let player_bodies: Vec<Body> = self
            .objects
            .iter()
            .filter_map(|o| match o {
                Object::Player(p) if !p.body.marked_for_removal => Some(p.body.clone()),
                _ => None,
            })
            .collect();
        for object in &mut self.objects {
            if let Object::Bat(bat) = object
                && !bat.body.marked_for_removal
            {
                bat.try_attack(&player_bodies, rng);
            }
        }

        // 2. flat view of every live shot
        let shots: Vec<ShotRef> = self
            .objects
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                Object::Bat(b) => Some((i, b)),
                _ => None,
            })
            .flat_map(|(i, b)| (0..b.projectiles.len()).map(move |k| (i, k)))
            .collect();

        // 3. enemies hit by other enemies' shots
        for i in 0..self.objects.len() {
            let Object::Bat(bat) = &self.objects[i] else {
                continue;
            };
            if bat.body.marked_for_removal || bat.is_immune() {
                continue;
            }
            if let Some(shot) = self.live_shot_colliding(&shots, &bat.body, Some(i)) {
                self.objects[i].body_mut().marked_for_removal = true;
                self.mark_projectile(shot);
                log::debug!("bat {} shot down", self.objects[i].id());
                audio.play(SoundEffect::EnemyHit);
            }
        }

        // 4. players hit by any shot
        for i in 0..self.objects.len() {
            let Object::Player(player) = &self.objects[i] else {
                continue;
            };
            if player.body.marked_for_removal {
                continue;
            }
            let hits: Vec<ShotRef> = shots
                .iter()
                .copied()
                .filter(|&shot| {
                    self.projectile(shot)
                        .is_some_and(|p| !p.body.marked_for_removal && player.body.collides_with(&p.body))
                })
                .collect();
            for shot in hits {
                self.mark_projectile(shot);
                if let Object::Player(player) = &mut self.objects[i] {
                    player.take_damage(PROJECTILE_DAMAGE);
                }
                audio.play(SoundEffect::PlayerHit);
            }
        }

        // 5. environmental bodies
        for s in 0..self.objects.len() {
            if !matches!(self.objects[s], Object::Shape(_)) || self.objects[s].body().marked_for_removal {
                continue;
            }
            self.resolve_shape(s, &shots, rng, audio);
        }

        // 6. roster and portal
        let before = self.enemies.len();
        let objects = &self.objects;
        self.enemies.retain(|&id| {
            objects
                .iter()
                .any(|o| o.id() == id && !o.body().marked_for_removal)
        });
        if self.enemies.len() != before {
            self.update_portal_state();
        }
    }

    fn resolve_shape<R: Rng + ?Sized>(
        &mut self,
        s: usize,
        shots: &[ShotRef],
        rng: &mut R,
        audio: &mut dyn AudioSink,
    ) {
        for o in 0..self.objects.len() {
            if o == s || self.objects[o].body().marked_for_removal {
                continue;
            }
            let (this, other) = pair_mut(&mut self.objects, s, o);
            let Object::Shape(shape) = this else {
                return;
            };
            if !shape.body.collides_with(other.body()) {
                continue;
            }
            match other {
                Object::Player(player) => {
                    shape.bounce_off_object(&player.body, rng);
                    shape.flash();
                    player.take_damage(SHAPE_CONTACT_DAMAGE);
                    audio.play(SoundEffect::EnvironmentHit);
                }
                Object::Bat(bat) => {
                    shape.bounce_off_object(&bat.body, rng);
                    shape.flash();
                    bat.body.marked_for_removal = true;
                    log::debug!("bat {} crushed by shape {}", bat.body.id, shape.body.id);
                    audio.play(SoundEffect::EnemyHit);
                }
                // Each pair once
                Object::Shape(other_shape) if o > s => {
                    let this_body = shape.body.clone();
                    shape.bounce_off_object(&other_shape.body, rng);
                    other_shape.bounce_off_object(&this_body, rng);
                    shape.flash();
                    other_shape.flash();
                    audio.play(SoundEffect::EnvironmentHit);
                }
                Object::Shape(_) => {}
            }
        }

        let Object::Shape(shape) = &self.objects[s] else {
            return;
        };
        let shape_body = shape.body.clone();
        let hits: Vec<ShotRef> = shots
            .iter()
            .copied()
            .filter(|&shot| {
                self.projectile(shot)
                    .is_some_and(|p| !p.body.marked_for_removal && shape_body.collides_with(&p.body))
            })
            .collect();
        for shot in &hits {
            self.mark_projectile(*shot);
            audio.play(SoundEffect::ProjectileShattered);
        }
        if !hits.is_empty()
            && let Object::Shape(shape) = &mut self.objects[s]
        {
            shape.flash();
        }
    }

    /// Portal color and lock state from the remaining enemy count
    fn update_portal_state(&mut self) {
        let remaining = self.enemies.len();
        if self.initial_enemy_count == 0 || remaining == 0 {
            self.portal.enable();
        } else {
            let progress = 1.0 - remaining as f32 / self.initial_enemy_count as f32;
            self.portal.progress_color(progress);
        }
    }

    /// Drop everything marked for removal
    pub fn prune(&mut self) {
        for object in &mut self.objects {
            if let Object::Bat(bat) = object {
                bat.prune_projectiles();
            }
        }
        self.objects.retain(|o| !o.body().marked_for_removal);
        let objects = &self.objects;
        self.players.retain(|&id| objects.iter().any(|o| o.id() == id));
        self.enemies.retain(|&id| objects.iter().any(|o| o.id() == id));
    }

    /// Advance to the next level, rolling into the next world; the player carries over
    pub fn next_level<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for object in &mut self.objects {
            if !matches!(object, Object::Player(_)) {
                object.body_mut().marked_for_removal = true;
            }
        }
        self.objects.retain(|o| !o.body().marked_for_removal);

        self.level_number += 1;
        if self.level_number > self.levels_per_world {
            self.level_number = 1;
            self.world_number += 1;
            log::info!("entering world {}", self.world_number);
        }
        self.setup_level(rng);
    }
}
