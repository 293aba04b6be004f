//! Page configuration.
//!
//! Every field has a default matching the stock page, so an embedding page
//! only needs to supply the values it wants to change, e.g.
//!
//! ```json
//! { "audio": { "tracks": ["audio/a.mp3", "audio/b.mp3"] }, "orbs": { "count": 4 } }
//! ```

use serde::Deserialize;

use crate::error::{FxError, FxResult};
use crate::layers::bars::BarScaling;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// `log` level name for the console logger.
    pub log_level: String,
    pub elements: ElementIds,
    pub audio: AudioConfig,
    pub starfield: StarfieldConfig,
    pub bars: BarsConfig,
    pub orbs: OrbConfig,
    pub particles: ParticleConfig,
    pub fractal: FractalConfig,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            elements: ElementIds::default(),
            audio: AudioConfig::default(),
            starfield: StarfieldConfig::default(),
            bars: BarsConfig::default(),
            orbs: OrbConfig::default(),
            particles: ParticleConfig::default(),
            fractal: FractalConfig::default(),
        }
    }
}

impl FxConfig {
    /// Parse and validate a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> FxResult<Self> {
        let config: FxConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    pub fn validate(&self) -> FxResult<()> {
        let fft = self.audio.fft_size;
        if !fft.is_power_of_two() || !(32..=32768).contains(&fft) {
            return Err(invalid(format!(
                "audio.fft_size must be a power of two in 32..=32768, got {fft}"
            )));
        }
        if self.starfield.speed <= 0.0 {
            return Err(invalid("starfield.speed must be positive"));
        }
        if self.starfield.focal_length <= 0.0 {
            return Err(invalid("starfield.focal_length must be positive"));
        }
        if self.orbs.min_radius <= 0.0 || self.orbs.max_radius < self.orbs.min_radius {
            return Err(invalid("orbs radius range must satisfy 0 < min <= max"));
        }
        let p = &self.particles;
        if p.gravity < 0.0 {
            return Err(invalid("particles.gravity must not be negative"));
        }
        if !(p.decay > 0.0 && p.decay <= 1.0) {
            return Err(invalid("particles.decay must lie in (0, 1]"));
        }
        if p.min_size > p.max_size {
            return Err(invalid("particles.min_size exceeds max_size"));
        }
        if p.low_fps_cap > p.max_particles {
            return Err(invalid("particles.low_fps_cap exceeds max_particles"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> FxError {
    FxError::InvalidConfig(msg.into())
}

/// DOM ids (and one selector) the page glue looks up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub music: String,
    pub hover_sound: String,
    pub mute_button: String,
    pub hover_links: String,
    pub visualizer: String,
    pub starfield: String,
    pub orbs: String,
    pub particles: String,
    pub fractal: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            music: "bg-music".into(),
            hover_sound: "hover-sound".into(),
            mute_button: "mute-toggle".into(),
            hover_links: ".orbital-links a".into(),
            visualizer: "audio-visualizer".into(),
            starfield: "warp-bg".into(),
            orbs: "orb-layer".into(),
            particles: "particle-layer".into(),
            fractal: "fractal-bg".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Analyser transform window; the snapshot holds half as many bins.
    pub fft_size: u32,
    /// Track URLs. Empty means "whatever the music element already points at".
    pub tracks: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { fft_size: 128, tracks: Vec::new() }
    }
}

impl AudioConfig {
    pub fn bin_count(&self) -> usize {
        self.fft_size as usize / 2
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub enabled: bool,
    pub count: usize,
    /// Depth travelled per frame.
    pub speed: f64,
    pub focal_length: f64,
    /// Alpha of the black overlay painted instead of a full clear.
    pub trail_alpha: f64,
    pub color: [u8; 3],
    pub max_size: f64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 200,
            speed: 2.0,
            focal_length: 128.0,
            trail_alpha: 0.3,
            color: [0, 255, 255],
            max_size: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BarsConfig {
    pub enabled: bool,
    /// Bar width as a multiple of `viewport width / bin count`.
    pub width_factor: f64,
    pub gutter: f64,
    pub scaling: BarScaling,
    /// Phase advance per bin for the sine colour wheel.
    pub hue_step: f64,
    /// Phase drift per second; zero keeps colours fixed per bin.
    pub hue_drift: f64,
    /// Only draw while music is playing.
    pub require_playback: bool,
}

impl Default for BarsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width_factor: 2.5,
            gutter: 1.0,
            scaling: BarScaling::default(),
            hue_step: 0.3,
            hue_drift: 0.0,
            require_playback: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    pub enabled: bool,
    pub count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Upper bound of each velocity component, px per frame.
    pub max_speed: f64,
    /// Degrees per frame.
    pub hue_speed: f64,
    /// Radians per frame.
    pub pulse_speed: f64,
    /// Fraction of the base radius swung by the pulse.
    pub pulse_depth: f64,
    pub audio_reactive: bool,
    /// Radius gain at full-scale magnitude.
    pub reactivity: f64,
    pub base_glow: f64,
    pub glow_gain: f64,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 6,
            min_radius: 60.0,
            max_radius: 160.0,
            max_speed: 0.6,
            hue_speed: 0.2,
            pulse_speed: 0.02,
            pulse_depth: 0.15,
            audio_reactive: true,
            reactivity: 0.5,
            base_glow: 0.25,
            glow_gain: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub enabled: bool,
    /// Particles spawned per pointer-move event.
    pub spawn_batch: usize,
    /// Upper bound of each initial velocity component.
    pub spread: f64,
    /// Downward acceleration, px per frame squared.
    pub gravity: f64,
    /// Life lost per frame.
    pub decay: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub max_particles: usize,
    /// Below this frame rate the population is capped at `low_fps_cap`.
    pub low_fps_threshold: f64,
    pub low_fps_cap: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_batch: 3,
            spread: 2.0,
            gravity: 0.05,
            decay: 0.02,
            min_size: 1.0,
            max_size: 4.0,
            max_particles: 600,
            low_fps_threshold: 30.0,
            low_fps_cap: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    pub enabled: bool,
    /// Multiplier applied to wall-clock seconds before they reach the shader.
    pub time_scale: f64,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self { enabled: true, time_scale: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = FxConfig::from_json("{}").unwrap();
        assert_eq!(config, FxConfig::default());
        assert_eq!(config.audio.bin_count(), 64);
        assert_eq!(config.particles.low_fps_threshold, 30.0);
        assert_eq!(config.particles.low_fps_cap, 50);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = FxConfig::from_json(
            r#"{ "audio": { "tracks": ["a.mp3", "b.mp3"] }, "orbs": { "count": 2 },
                 "bars": { "scaling": { "mode": "normalized", "max_fraction": 0.5 } } }"#,
        )
        .unwrap();
        assert_eq!(config.audio.tracks, vec!["a.mp3", "b.mp3"]);
        assert_eq!(config.audio.fft_size, 128);
        assert_eq!(config.orbs.count, 2);
        assert_eq!(config.orbs.max_radius, OrbConfig::default().max_radius);
        assert_eq!(config.bars.scaling, BarScaling::Normalized { max_fraction: 0.5 });
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            FxConfig::from_json(r#"{ "audio": { "fft_size": 100 } }"#),
            Err(FxError::InvalidConfig(_))
        ));
        assert!(matches!(
            FxConfig::from_json(r#"{ "particles": { "decay": 0.0 } }"#),
            Err(FxError::InvalidConfig(_))
        ));
        assert!(matches!(FxConfig::from_json("{ nope"), Err(FxError::ConfigParse(_))));
    }

    #[test]
    fn log_level_falls_back_to_info() {
        let mut config = FxConfig::default();
        config.log_level = "debug".into();
        assert_eq!(config.log_level(), log::Level::Debug);
        config.log_level = "loud".into();
        assert_eq!(config.log_level(), log::Level::Info);
    }
}
