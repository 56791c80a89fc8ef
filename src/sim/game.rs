//! Per-frame engine sweep
//!
//! Order within a frame:
//! 1. input (movement, gravity-ball clicks, wind)
//! 2. portal entry
//! 3. entity updates, then rain and gravity wells
//! 4. level collision resolution
//! 5. prune, then game-over check

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::body::Attractable;
use super::gravity::GravityBallSystem;
use super::level::{Level, PlayerFactory};
use super::player::{MoveKeys, Player};
use super::rain::RainSystem;
use crate::ScreenBounds;
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player is gone; only restart does anything
    GameOver,
}

/// Input for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: MoveKeys,
    /// Left click position; spawns a gravity ball
    pub click: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
    /// Start over (only after game over)
    pub restart: bool,
    /// Explicit wind override
    pub wind_force: Option<f32>,
}

/// Everything needed to build a game
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub bounds: ScreenBounds,
    pub seed: u64,
    pub rain_enabled: bool,
    pub max_raindrops: usize,
    pub levels_per_world: u32,
    pub player_factory: PlayerFactory,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bounds: ScreenBounds::default(),
            seed: 0,
            rain_enabled: true,
            max_raindrops: 2000,
            levels_per_world: LEVELS_PER_WORLD,
            player_factory: Player::new,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub level: Level,
    pub rain: RainSystem,
    pub gravity: GravityBallSystem,
    pub phase: GamePhase,
    /// Simulated seconds since the last (re)start
    pub time: f32,
    config: GameConfig,
    rng: Pcg32,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let level = Self::first_level(&config, &mut rng);
        Self {
            level,
            rain: RainSystem::new(config.bounds, config.max_raindrops),
            gravity: GravityBallSystem::new(config.bounds),
            phase: GamePhase::Playing,
            time: 0.0,
            config,
            rng,
        }
    }

    fn first_level(config: &GameConfig, rng: &mut Pcg32) -> Level {
        let mut level = Level::new(1, 1, config.bounds, config.player_factory, rng);
        level.levels_per_world = config.levels_per_world.max(1);
        level
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn set_rain_enabled(&mut self, enabled: bool) {
        self.config.rain_enabled = enabled;
        if !enabled {
            self.rain.drops.clear();
        }
    }

    /// Back to world 1 level 1 with fresh rain and gravity wells
    pub fn restart(&mut self) {
        log::info!("restarting");
        self.level = Self::first_level(&self.config, &mut self.rng);
        self.rain = RainSystem::new(self.config.bounds, self.config.max_raindrops);
        self.gravity = GravityBallSystem::new(self.config.bounds);
        self.phase = GamePhase::Playing;
        self.time = 0.0;
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &TickInput, dt: f32, audio: &mut dyn AudioSink) {
        if input.restart && self.phase == GamePhase::GameOver {
            self.restart();
        }
        if input.pause {
            self.phase = match self.phase {
                GamePhase::Playing => GamePhase::Paused,
                GamePhase::Paused => GamePhase::Playing,
                GamePhase::GameOver => GamePhase::GameOver,
            };
        }
        if self.phase != GamePhase::Playing {
            return;
        }

        let dt = dt.min(MAX_FRAME_DT);
        if dt <= 0.0 {
            return;
        }

        // Input
        if let Some(force) = input.wind_force {
            self.rain.set_wind_force(force);
        }
        if let Some(player) = self.level.player_mut() {
            player.handle_input(input.keys);
        }
        if let Some(pos) = input.click {
            self.gravity.create_gravity_ball(pos);
            audio.play(SoundEffect::GravityBallSpawn);
        }

        // Portal
        if self.level.player_at_portal() {
            audio.play(SoundEffect::PortalEnter);
            self.level.next_level(&mut self.rng);
        }

        // Motion
        self.level.update_objects(dt, &mut self.rng);
        if self.config.rain_enabled {
            let solids = self.level.solid_bodies();
            self.rain.update(dt, &solids, &mut self.rng);
        }
        {
            let mut targets = self.level.attractables_mut();
            targets.extend(
                self.rain
                    .drops
                    .iter_mut()
                    .map(|d| d as &mut dyn Attractable),
            );
            self.gravity.update(dt, &mut targets);
        }

        // Collisions and cleanup
        self.level.update(&mut self.rng, audio);
        self.level.prune();
        self.time += dt;

        if self.level.players.is_empty() {
            log::info!(
                "game over in world {} level {} after {:.1}s",
                self.level.world_number,
                self.level.level_number,
                self.time
            );
            self.phase = GamePhase::GameOver;
            audio.play(SoundEffect::GameOver);
        }
    }
}
