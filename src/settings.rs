//! Game settings and preferences
//!
//! Stored as JSON next to the binary. Missing fields take their defaults so
//! an old or hand-written file still loads.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ScreenBounds;
use crate::audio::AudioManager;
use crate::consts::*;
use crate::sim::GameConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live raindrops for this preset
    pub fn max_raindrops(&self) -> usize {
        match self {
            QualityPreset::Low => 400,
            QualityPreset::Medium => 1200,
            QualityPreset::High => 2000,
        }
    }

    /// Triangles per tessellated circle
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => 24,
            QualityPreset::High => 48,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub screen_width: f32,
    pub screen_height: f32,
    /// RNG seed; the same seed and input replay the same game
    pub seed: u64,
    pub levels_per_world: u32,

    // === Visuals ===
    /// Graphics quality preset
    pub quality: QualityPreset,
    pub rain_enabled: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            seed: 0,
            levels_per_world: LEVELS_PER_WORLD,

            quality: QualityPreset::Medium,
            rain_enabled: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective raindrop cap (zero with rain off)
    pub fn max_raindrops(&self) -> usize {
        if !self.rain_enabled {
            0
        } else {
            self.quality.max_raindrops()
        }
    }

    pub fn bounds(&self) -> ScreenBounds {
        ScreenBounds::new(self.screen_width.max(1.0), self.screen_height.max(1.0))
    }

    pub fn to_game_config(&self) -> GameConfig {
        GameConfig {
            bounds: self.bounds(),
            seed: self.seed,
            rain_enabled: self.rain_enabled,
            max_raindrops: self.max_raindrops(),
            levels_per_world: self.levels_per_world.max(1),
            ..GameConfig::default()
        }
    }

    /// Push volume and mute into the audio manager
    pub fn apply_audio(&self, audio: &mut AudioManager) {
        audio.set_master_volume(self.master_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_muted(self.muted);
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e} ({}); using default settings", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
