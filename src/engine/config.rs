use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// When a recording session is considered finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionPolicy {
    /// Window reaches `max_window_seconds` or `max_window_samples`.
    Duration,
    /// Motion stays under `quiet_threshold` for `quiet_seconds`.
    Stillness,
    #[default]
    Either,
}

impl CompletionPolicy {
    pub const fn uses_stillness(self) -> bool {
        matches!(self, Self::Stillness | Self::Either)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub jerk_threshold: f64,
    pub jerk_cooldown_seconds: f64,
    pub max_window_seconds: f64,
    pub max_window_samples: usize,
    pub min_window_seconds: f64,
    pub recognition_distance_threshold: f64,
    pub recognition_margin: f64,
    pub resample_points: usize,
    pub variance_floor: f64,
    pub completion: CompletionPolicy,
    pub quiet_threshold: f64,
    pub quiet_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jerk_threshold: 0.6,
            jerk_cooldown_seconds: 0.25,
            max_window_seconds: 2.0,
            max_window_samples: 256,
            min_window_seconds: 0.4,
            recognition_distance_threshold: 0.35,
            recognition_margin: 0.1,
            resample_points: 32,
            variance_floor: 0.05,
            completion: CompletionPolicy::Either,
            quiet_threshold: 0.05,
            quiet_seconds: 0.4,
        }
    }
}

impl EngineConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Missing keys fall back to defaults; the result is validated.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("jerk_threshold", self.jerk_threshold),
            ("jerk_cooldown_seconds", self.jerk_cooldown_seconds),
            ("max_window_seconds", self.max_window_seconds),
            ("min_window_seconds", self.min_window_seconds),
            (
                "recognition_distance_threshold",
                self.recognition_distance_threshold,
            ),
            ("recognition_margin", self.recognition_margin),
            ("variance_floor", self.variance_floor),
            ("quiet_threshold", self.quiet_threshold),
            ("quiet_seconds", self.quiet_seconds),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return Err(invalid(format!("{name} must be a finite number")));
        }

        if self.jerk_threshold <= 0.0 {
            return Err(invalid("jerk_threshold must be > 0"));
        }
        if self.jerk_cooldown_seconds < 0.0 {
            return Err(invalid("jerk_cooldown_seconds must be >= 0"));
        }
        if self.max_window_seconds <= 0.0 {
            return Err(invalid("max_window_seconds must be > 0"));
        }
        if self.max_window_samples < 2 {
            return Err(invalid("max_window_samples must be >= 2"));
        }
        if self.min_window_seconds < 0.0 {
            return Err(invalid("min_window_seconds must be >= 0"));
        }
        if self.min_window_seconds > self.max_window_seconds {
            return Err(invalid(
                "min_window_seconds must be <= max_window_seconds",
            ));
        }
        if self.resample_points < 2 {
            return Err(invalid("resample_points must be >= 2"));
        }
        if self.recognition_distance_threshold <= 0.0 {
            return Err(invalid("recognition_distance_threshold must be > 0"));
        }
        if self.recognition_margin < 0.0 {
            return Err(invalid("recognition_margin must be >= 0"));
        }
        if self.variance_floor <= 0.0 {
            return Err(invalid("variance_floor must be > 0"));
        }
        if self.quiet_threshold <= 0.0 {
            return Err(invalid("quiet_threshold must be > 0"));
        }
        if self.quiet_seconds <= 0.0 {
            return Err(invalid("quiet_seconds must be > 0"));
        }
        Ok(())
    }

    pub fn jerk_cooldown_ms(&self) -> u64 {
        seconds_to_ms(self.jerk_cooldown_seconds)
    }

    pub fn max_window_ms(&self) -> u64 {
        seconds_to_ms(self.max_window_seconds)
    }

    pub fn min_window_ms(&self) -> u64 {
        seconds_to_ms(self.min_window_seconds)
    }

    pub fn quiet_ms(&self) -> u64 {
        seconds_to_ms(self.quiet_seconds)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1_000.0).round().max(0.0) as u64
}
