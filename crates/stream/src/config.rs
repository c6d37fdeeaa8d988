use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on `sampler_rings * sampler_angles` per tick.
pub const MAX_SAMPLES_PER_TICK: u64 = 65_536;

/// Streaming configuration: radii, retention age, debounce threshold and sampler density.
///
/// Distances are in world units. Missing YAML fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Distance within which regions are proactively generated.
    pub streaming_radius: f32,
    /// Distance beyond which regions are reclaimed. Must not be smaller than `streaming_radius`.
    pub unload_radius: f32,
    /// Initial render-fog cutoff distance.
    pub fog_visibility_range: f32,
    /// Regions not rediscovered for longer than this are evicted regardless of distance.
    pub max_idle_age_ms: u64,
    /// Minimum player displacement before a tick does any work.
    pub movement_threshold: f32,
    /// Number of concentric sampling rings around the player.
    pub sampler_rings: u32,
    /// Angular samples per ring.
    pub sampler_angles: u32,
    /// Consecutive failures after which a region stops being re-admitted.
    /// `None` retries forever.
    pub max_generation_attempts: Option<u32>,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            streaming_radius: 300.0,
            unload_radius: 500.0,
            fog_visibility_range: 400.0,
            max_idle_age_ms: 30_000,
            movement_threshold: 5.0,
            sampler_rings: 4,
            sampler_angles: 16,
            max_generation_attempts: None,
        }
    }
}

/// Streaming and unload radii after coupling with the fog range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRadii {
    pub streaming: f32,
    pub unload: f32,
}

impl StreamingConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn max_idle_age(&self) -> Duration {
        Duration::from_millis(self.max_idle_age_ms)
    }

    /// The one place the fog coupling is computed; used by the update path and every getter.
    pub fn derived_radii(&self, fog_visibility_range: f32) -> DerivedRadii {
        DerivedRadii {
            streaming: self.streaming_radius.min(fog_visibility_range * 0.75),
            unload: self.unload_radius.max(fog_visibility_range * 1.25),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("streaming_radius", self.streaming_radius),
            ("unload_radius", self.unload_radius),
            ("fog_visibility_range", self.fog_visibility_range),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if self.unload_radius < self.streaming_radius {
            return Err(ConfigError::Invalid(format!(
                "unload_radius ({}) must not be smaller than streaming_radius ({})",
                self.unload_radius, self.streaming_radius
            )));
        }
        if !self.movement_threshold.is_finite() || self.movement_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "movement_threshold must be finite and non-negative, got {}",
                self.movement_threshold
            )));
        }
        if self.sampler_rings == 0 || self.sampler_angles == 0 {
            return Err(ConfigError::Invalid(
                "sampler_rings and sampler_angles must be at least 1".into(),
            ));
        }
        let samples = u64::from(self.sampler_rings) * u64::from(self.sampler_angles);
        if samples > MAX_SAMPLES_PER_TICK {
            return Err(ConfigError::Invalid(format!(
                "sampler_rings * sampler_angles must not exceed {MAX_SAMPLES_PER_TICK}, got {samples}"
            )));
        }
        if self.max_generation_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "max_generation_attempts must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_config_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.streaming_radius, 300.0);
        assert_eq!(config.unload_radius, 500.0);
        assert_eq!(config.fog_visibility_range, 400.0);
        assert_eq!(config.max_idle_age(), Duration::from_secs(30));
        assert_eq!(config.movement_threshold, 5.0);
        assert_eq!(config.sampler_rings, 4);
        assert_eq!(config.sampler_angles, 16);
        assert!(config.max_generation_attempts.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn effective_radius_is_capped_by_fog() {
        let config = StreamingConfig::default();
        let radii = config.derived_radii(400.0);
        assert_eq!(radii.streaming, 300.0);
        assert_eq!(radii.unload, 500.0);

        let radii = config.derived_radii(200.0);
        assert_eq!(radii.streaming, 150.0);
        assert_eq!(radii.unload, 500.0);

        let radii = config.derived_radii(800.0);
        assert_eq!(radii.streaming, 300.0);
        assert_eq!(radii.unload, 1000.0);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = StreamingConfig::from_yaml_str("streaming_radius: 120\nsampler_angles: 8\n").unwrap();
        assert_eq!(config.streaming_radius, 120.0);
        assert_eq!(config.sampler_angles, 8);
        assert_eq!(config.unload_radius, 500.0);
    }

    #[test]
    fn yaml_roundtrip_preserves_values() {
        let config = StreamingConfig {
            max_generation_attempts: Some(3),
            ..StreamingConfig::default()
        };
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(StreamingConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn unload_smaller_than_streaming_is_rejected() {
        let err = StreamingConfig::from_yaml_str("streaming_radius: 600\nunload_radius: 500\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_sampler_density_is_rejected() {
        let config = StreamingConfig {
            sampler_rings: 0,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_sampler_density_is_rejected() {
        let config = StreamingConfig {
            sampler_rings: u32::MAX,
            sampler_angles: u32::MAX,
            ..StreamingConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = StreamingConfig {
            sampler_rings: 256,
            sampler_angles: 256,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_attempt_cap_is_rejected() {
        let config = StreamingConfig {
            max_generation_attempts: Some(0),
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_yaml_reports_yaml_error() {
        let err = StreamingConfig::from_yaml_str("streaming_radius: [not a number").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
