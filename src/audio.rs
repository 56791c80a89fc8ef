//! Audio hooks
//!
//! The simulation fires sound effects through [`AudioSink`] and never waits
//! on them. [`AudioManager`] applies volume and mute, queues what was played
//! for the backend to drain, and can synthesize each effect procedurally from
//! a few enveloped oscillators - no sample files needed.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player struck by a projectile
    PlayerHit,
    /// Bat killed
    EnemyHit,
    /// Environmental body bumped something
    EnvironmentHit,
    /// Projectile broke on an environmental body
    ProjectileShattered,
    /// Gravity well summoned
    GravityBallSpawn,
    /// Player stepped through the portal
    PortalEnter,
    /// Player died
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator voice with an exponential frequency sweep and gain decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_freq: f32,
    pub end_freq: f32,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Seconds
    pub duration: f32,
}

const fn tone(waveform: Waveform, start_freq: f32, end_freq: f32, gain: f32, duration: f32) -> Tone {
    Tone {
        waveform,
        start_freq,
        end_freq,
        gain,
        duration,
    }
}

use Waveform::*;

// Solid thump
const PLAYER_HIT: &[Tone] = &[tone(Sine, 150.0, 60.0, 0.6, 0.15)];
// Squeak plus crunch
const ENEMY_HIT: &[Tone] = &[
    tone(Square, 900.0, 300.0, 0.25, 0.12),
    tone(Sawtooth, 120.0, 50.0, 0.3, 0.2),
];
// Soft ping
const ENVIRONMENT_HIT: &[Tone] = &[tone(Triangle, 400.0, 380.0, 0.3, 0.08)];
// Glassy sizzle over a small thump
const PROJECTILE_SHATTERED: &[Tone] = &[
    tone(Square, 6000.0, 4000.0, 0.12, 0.1),
    tone(Sine, 60.0, 50.0, 0.3, 0.1),
];
// Rising hum
const GRAVITY_BALL_SPAWN: &[Tone] = &[tone(Sine, 200.0, 600.0, 0.4, 0.3)];
// Sweep up two octaves
const PORTAL_ENTER: &[Tone] = &[
    tone(Triangle, 300.0, 1200.0, 0.4, 0.5),
    tone(Sine, 450.0, 1800.0, 0.2, 0.5),
];
// Long fall
const GAME_OVER: &[Tone] = &[tone(Sawtooth, 400.0, 60.0, 0.5, 1.2)];

impl SoundEffect {
    pub const ALL: [SoundEffect; 7] = [
        SoundEffect::PlayerHit,
        SoundEffect::EnemyHit,
        SoundEffect::EnvironmentHit,
        SoundEffect::ProjectileShattered,
        SoundEffect::GravityBallSpawn,
        SoundEffect::PortalEnter,
        SoundEffect::GameOver,
    ];

    /// Voices mixed to make this effect
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundEffect::PlayerHit => PLAYER_HIT,
            SoundEffect::EnemyHit => ENEMY_HIT,
            SoundEffect::EnvironmentHit => ENVIRONMENT_HIT,
            SoundEffect::ProjectileShattered => PROJECTILE_SHATTERED,
            SoundEffect::GravityBallSpawn => GRAVITY_BALL_SPAWN,
            SoundEffect::PortalEnter => PORTAL_ENTER,
            SoundEffect::GameOver => GAME_OVER,
        }
    }

    /// Longest voice
    pub fn duration(self) -> f32 {
        self.tones().iter().map(|t| t.duration).fold(0.0, f32::max)
    }
}

/// Anything that can play sound effects
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Effects played since the last drain
    pending: Vec<SoundEffect>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pending: Vec::new(),
        }
    }

    /// Muted manager that drops everything
    pub fn silent() -> Self {
        let mut audio = Self::new();
        audio.muted = true;
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Take every effect queued since the last call
    pub fn drain(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.pending)
    }

    /// Mono PCM samples for an effect at the current volume
    pub fn synthesize(&self, effect: SoundEffect, sample_rate: u32) -> Vec<f32> {
        let vol = self.effective_volume();
        let rate = sample_rate.max(1) as f32;
        let len = (effect.duration() * rate).ceil() as usize;
        let mut out = vec![0.0f32; len];

        for voice in effect.tones() {
            let voice_len = ((voice.duration * rate).ceil() as usize).min(len);
            let ratio = voice.end_freq / voice.start_freq;
            let mut phase = 0.0f32;
            for (i, sample) in out.iter_mut().take(voice_len).enumerate() {
                let t = i as f32 / voice_len as f32;
                let freq = voice.start_freq * ratio.powf(t);
                // Exponential decay to 1% over the voice
                let envelope = 0.01f32.powf(t);
                *sample += oscillator(voice.waveform, phase) * voice.gain * envelope * vol;
                phase = (phase + freq / rate).fract();
            }
        }

        for sample in &mut out {
            *sample = sample.clamp(-1.0, 1.0);
        }
        out
    }
}

/// One cycle of a waveform, `phase` in [0, 1)
fn oscillator(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, effect: SoundEffect) {
        if self.effective_volume() <= 0.0 {
            return;
        }
        log::trace!("sfx {effect:?}");
        self.pending.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_queues_until_drained() {
        let mut audio = AudioManager::new();
        audio.play(SoundEffect::PlayerHit);
        audio.play(SoundEffect::EnemyHit);
        assert_eq!(audio.drain(), vec![SoundEffect::PlayerHit, SoundEffect::EnemyHit]);
        assert!(audio.drain().is_empty());
    }

    #[test]
    fn test_muted_or_silent_drops_effects() {
        let mut audio = AudioManager::silent();
        audio.play(SoundEffect::GameOver);
        assert!(audio.drain().is_empty());

        let mut audio = AudioManager::new();
        audio.set_master_volume(0.0);
        audio.play(SoundEffect::GameOver);
        assert!(audio.drain().is_empty());
    }

    #[test]
    fn test_volume_clamps() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(-1.0);
        assert_eq!(audio.effective_volume(), 0.0);
        audio.set_sfx_volume(0.5);
        assert_eq!(audio.effective_volume(), 0.5);
    }

    #[test]
    fn test_synthesized_length_and_range() {
        let audio = AudioManager::new();
        for effect in SoundEffect::ALL {
            let samples = audio.synthesize(effect, 8000);
            assert_eq!(samples.len(), (effect.duration() * 8000.0).ceil() as usize);
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
            assert!(samples.iter().any(|s| s.abs() > 0.0), "{effect:?} is silent");
        }
        let muted = AudioManager::silent().synthesize(SoundEffect::PlayerHit, 8000);
        assert!(muted.iter().all(|s| *s == 0.0));
    }
}
