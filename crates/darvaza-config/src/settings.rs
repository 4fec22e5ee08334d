//! Engine settings file.
//!
//! The settings fixed for a processor's lifetime, as TOML:
//!
//! ```toml
//! sample_rate = 48000.0
//! channels = 2
//! max_record_seconds = 30.0
//!
//! [limiter]
//! threshold = 0.6
//! attack_ms = 10.0
//! release_ms = 500.0
//!
//! [crusher]
//! input_mix = 0.5
//! output_mix = 0.5
//!
//! [interpolation]
//! mode = "fixed"
//! fraction = 0.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use darvaza_engine::{Interpolation, MAX_RECORD_SECONDS, ProcessorConfig};

use crate::error::ConfigError;

/// Limiter section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterSettings {
    /// Linear ceiling.
    pub threshold: f32,
    /// Lookahead in milliseconds.
    pub attack_ms: f32,
    /// Release in milliseconds.
    pub release_ms: f32,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            attack_ms: 10.0,
            release_ms: 500.0,
        }
    }
}

/// Bit crusher gain section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrusherSettings {
    /// Gain into the quantizer.
    pub input_mix: f32,
    /// Gain after the quantizer.
    pub output_mix: f32,
}

impl Default for CrusherSettings {
    fn default() -> Self {
        Self {
            input_mix: 0.5,
            output_mix: 0.5,
        }
    }
}

/// Playback read interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum InterpolationSettings {
    /// Blend neighbours by a constant fraction.
    Fixed {
        /// Weight of the later neighbour.
        #[serde(default)]
        fraction: f32,
    },
    /// Blend neighbours by the read pointer's fractional part.
    Linear,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        InterpolationSettings::Fixed { fraction: 0.0 }
    }
}

impl From<InterpolationSettings> for Interpolation {
    fn from(settings: InterpolationSettings) -> Self {
        match settings {
            InterpolationSettings::Fixed { fraction } => Interpolation::Fixed(fraction),
            InterpolationSettings::Linear => Interpolation::Linear,
        }
    }
}

/// Settings a [`Processor`](darvaza_engine::Processor) is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Sample rate in Hz. Overridden by the input file when rendering.
    pub sample_rate: f32,
    /// Channels to preallocate.
    pub channels: usize,
    /// Record ring length in seconds.
    pub max_record_seconds: f32,
    /// Output limiter.
    pub limiter: LimiterSettings,
    /// Bit crusher gains.
    pub crusher: CrusherSettings,
    /// Playback interpolation.
    pub interpolation: InterpolationSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            max_record_seconds: MAX_RECORD_SECONDS,
            limiter: LimiterSettings::default(),
            crusher: CrusherSettings::default(),
            interpolation: InterpolationSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: EngineSettings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid_parameter(name, "must be a positive number"))
            }
        };
        positive("sample_rate", self.sample_rate)?;
        positive("max_record_seconds", self.max_record_seconds)?;
        positive("limiter.threshold", self.limiter.threshold)?;
        if self.channels == 0 {
            return Err(ConfigError::invalid_parameter("channels", "must be at least 1"));
        }
        Ok(())
    }

    /// The engine configuration these settings describe.
    pub fn to_processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            max_record_seconds: self.max_record_seconds,
            limiter_threshold: self.limiter.threshold,
            limiter_attack_ms: self.limiter.attack_ms,
            limiter_release_ms: self.limiter.release_ms,
            crusher_input_mix: self.crusher.input_mix,
            crusher_output_mix: self.crusher.output_mix,
            interpolation: self.interpolation.into(),
        }
    }
}
