//! Rain Runner entry point
//!
//! Headless driver: loads settings, plays the game with a scripted pilot at
//! a fixed 60 Hz step, renders every frame to a CPU mesh and logs a summary.
//!
//! Usage: `rain-runner [settings.json] [frames]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::collections::HashMap;

    use glam::Vec2;
    use rain_runner::renderer::{MeshRenderer, render_game};
    use rain_runner::sim::{Game, GamePhase, MoveKeys, TickInput};
    use rain_runner::{AudioManager, Settings, SoundEffect};

    pub const SIM_DT: f32 = 1.0 / 60.0;
    pub const DEFAULT_FRAMES: u64 = 3600;
    /// Seconds between gravity balls dropped on the nearest bat
    const CLICK_INTERVAL: f32 = 1.5;
    /// Dead zone before the pilot steers
    const STEER_SLACK: f32 = 10.0;

    pub struct Driver {
        game: Game,
        audio: AudioManager,
        renderer: MeshRenderer,
        click_timer: f32,
        sounds: HashMap<SoundEffect, u32>,
        deaths: u32,
        best: (u32, u32),
        max_vertices: usize,
    }

    impl Driver {
        pub fn new(settings: &Settings) -> Self {
            let mut audio = AudioManager::new();
            settings.apply_audio(&mut audio);
            Self {
                game: Game::new(settings.to_game_config()),
                audio,
                renderer: MeshRenderer::new(settings.quality),
                click_timer: 0.0,
                sounds: HashMap::new(),
                deaths: 0,
                best: (1, 1),
                max_vertices: 0,
            }
        }

        /// Input the pilot would give this frame
        fn pilot(&mut self) -> TickInput {
            if self.game.phase == GamePhase::GameOver {
                return TickInput {
                    restart: true,
                    ..Default::default()
                };
            }
            let Some(player) = self.game.level.player() else {
                return TickInput::default();
            };
            let me = player.body.center();

            // Head for the portal once it opens, otherwise shadow the bats
            // from below where their shots can be pulled away
            let goal = if self.game.level.portal.enabled {
                self.game.level.portal.body.center()
            } else {
                let bounds = self.game.config().bounds;
                let x = self
                    .game
                    .level
                    .bats()
                    .map(|b| b.body.center().x)
                    .min_by(|a, b| (a - me.x).abs().total_cmp(&(b - me.x).abs()))
                    .unwrap_or(bounds.width / 2.0);
                Vec2::new(x, bounds.height * 0.6)
            };
            let keys = MoveKeys {
                left: goal.x < me.x - STEER_SLACK,
                right: goal.x > me.x + STEER_SLACK,
                up: goal.y < me.y - STEER_SLACK,
                down: goal.y > me.y + STEER_SLACK,
            };

            self.click_timer += SIM_DT;
            let click = if self.click_timer >= CLICK_INTERVAL {
                self.click_timer = 0.0;
                self.game
                    .level
                    .bats()
                    .map(|b| b.body.center())
                    .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)))
            } else {
                None
            };

            TickInput {
                keys,
                click,
                ..Default::default()
            }
        }

        /// Run one simulation step and render it
        pub fn step(&mut self) {
            let input = self.pilot();
            let was_playing = self.game.phase == GamePhase::Playing;
            self.game.tick(&input, SIM_DT, &mut self.audio);

            if was_playing && self.game.phase == GamePhase::GameOver {
                self.deaths += 1;
            }
            let reached = (self.game.level.world_number, self.game.level.level_number);
            self.best = self.best.max(reached);

            for effect in self.audio.drain() {
                *self.sounds.entry(effect).or_default() += 1;
            }

            render_game(&self.game, &mut self.renderer);
            self.max_vertices = self.max_vertices.max(self.renderer.vertices.len());
        }

        pub fn report(&self) {
            let level = &self.game.level;
            log::info!(
                "finished after {} frames: world {}-{} (best {}-{}), {} deaths",
                self.renderer.frames(),
                level.world_number,
                level.level_number,
                self.best.0,
                self.best.1,
                self.deaths
            );
            log::info!(
                "{} raindrops, {} gravity balls, {} bats alive, peak {} vertices",
                self.game.rain.drops.len(),
                self.game.gravity.balls.len(),
                level.bats().count(),
                self.max_vertices
            );
            let mut sounds: Vec<_> = self.sounds.iter().collect();
            sounds.sort_by_key(|(effect, _)| format!("{effect:?}"));
            for (effect, count) in sounds {
                log::info!("  {effect:?}: {count}");
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rain_runner::Settings;

    env_logger::init();
    log::info!("Rain Runner (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let frames = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            log::warn!("bad frame count ({e}); running {}", headless::DEFAULT_FRAMES);
            headless::DEFAULT_FRAMES
        }
        None => headless::DEFAULT_FRAMES,
    };
    log::info!(
        "seed {}, quality {}, {} frames at {:.0} Hz",
        settings.seed,
        settings.quality.as_str(),
        frames,
        1.0 / headless::SIM_DT
    );

    let mut driver = headless::Driver::new(&settings);
    for _ in 0..frames {
        driver.step();
    }
    driver.report();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is driven by the host page
}
