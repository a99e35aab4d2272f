use std::time::Duration;

use atlas_hash::FieldElement;
use atlas_resilience::{BreakerConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be >= {min}, got {value}")]
    BelowMinimum { field: &'static str, min: f64, value: f64 },
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange { field: &'static str, min: f64, max: f64, value: f64 },
    #[error("failed to parse config file: {0}")]
    Parse(String),
    #[error("failed to read config file: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 200, backoff_multiplier: 2.0, max_delay_ms: 10_000 }
    }
}

impl RetrySettings {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_duration_ms: u64,
    pub half_open_max_calls: u32,
    pub monitoring_window_ms: u64,
    pub volume_threshold: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            open_duration_ms: 30_000,
            half_open_max_calls: 1,
            monitoring_window_ms: 60_000,
            volume_threshold: 10,
        }
    }
}

impl BreakerSettings {
    pub fn to_breaker_config(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            open_duration: Duration::from_millis(self.open_duration_ms),
            half_open_max_calls: self.half_open_max_calls,
            monitoring_window: Duration::from_millis(self.monitoring_window_ms),
            volume_threshold: self.volume_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HaltSettings {
    pub on_topology: bool,
    pub on_completeness: bool,
    pub on_coordinate: bool,
}

impl Default for HaltSettings {
    fn default() -> Self {
        Self { on_topology: true, on_completeness: true, on_coordinate: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub min_quality_score: u8,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self { min_quality_score: 70 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSettings {
    pub tolerance_percent: f64,
    pub min_overlap_percent: f64,
    pub require_both_sources: bool,
}

impl Default for CrossSettings {
    fn default() -> Self {
        Self { tolerance_percent: 0.1, min_overlap_percent: 95.0, require_both_sources: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MerkleSettings {
    pub min_depth: u32,
    /// Hex-encoded (`0x...`) sentinel field element; falls back to
    /// [`atlas_hash::sentinel_hash`] when absent.
    pub sentinel_hash: Option<String>,
}

impl Default for MerkleSettings {
    fn default() -> Self {
        Self { min_depth: 14, sentinel_hash: None }
    }
}

impl MerkleSettings {
    pub fn sentinel(&self) -> Result<FieldElement, ConfigError> {
        match &self.sentinel_hash {
            Some(hex) => FieldElement::from_hex(hex).map_err(|e| ConfigError::Parse(e.to_string())),
            None => Ok(atlas_hash::sentinel_hash()),
        }
    }
}

/// Typed configuration record (spec §6). Constructed via [`Default`],
/// [`PipelineConfig::from_toml_str`]/[`PipelineConfig::from_toml_file`], or a
/// plain struct literal for embedding; always validated before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_parallel: usize,
    pub rate_limit_per_host: f64,
    pub retry: RetrySettings,
    pub breaker: BreakerSettings,
    pub halt: HaltSettings,
    pub validation: ValidationSettings,
    pub cross: CrossSettings,
    pub merkle: MerkleSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel: 6,
            rate_limit_per_host: 5.0,
            retry: RetrySettings::default(),
            breaker: BreakerSettings::default(),
            halt: HaltSettings::default(),
            validation: ValidationSettings::default(),
            cross: CrossSettings::default(),
            merkle: MerkleSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parallel < 1 {
            return Err(ConfigError::BelowMinimum { field: "max_parallel", min: 1.0, value: self.max_parallel as f64 });
        }
        if self.rate_limit_per_host <= 0.0 {
            return Err(ConfigError::BelowMinimum {
                field: "rate_limit_per_host",
                min: f64::EPSILON,
                value: self.rate_limit_per_host,
            });
        }
        if self.retry.max_attempts < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "retry.max_attempts",
                min: 1.0,
                value: self.retry.max_attempts as f64,
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::BelowMinimum {
                field: "retry.backoff_multiplier",
                min: 1.0,
                value: self.retry.backoff_multiplier,
            });
        }
        if self.breaker.failure_threshold < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "breaker.failure_threshold",
                min: 1.0,
                value: self.breaker.failure_threshold as f64,
            });
        }
        if self.breaker.success_threshold < 1 {
            return Err(ConfigError::BelowMinimum {
                field: "breaker.success_threshold",
                min: 1.0,
                value: self.breaker.success_threshold as f64,
            });
        }
        if self.validation.min_quality_score > 100 {
            return Err(ConfigError::OutOfRange {
                field: "validation.min_quality_score",
                min: 0.0,
                max: 100.0,
                value: self.validation.min_quality_score as f64,
            });
        }
        if !(0.0..=100.0).contains(&self.cross.min_overlap_percent) {
            return Err(ConfigError::OutOfRange {
                field: "cross.min_overlap_percent",
                min: 0.0,
                max: 100.0,
                value: self.cross.min_overlap_percent,
            });
        }
        if self.merkle.min_depth < 1 {
            return Err(ConfigError::BelowMinimum { field: "merkle.min_depth", min: 1.0, value: self.merkle.min_depth as f64 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_max_parallel() {
        let mut config = PipelineConfig::default();
        config.max_parallel = 0;
        assert!(matches!(config.validate(), Err(ConfigError::BelowMinimum { field: "max_parallel", .. })));
    }

    #[test]
    fn toml_roundtrip_overrides_defaults() {
        let toml = r#"
            max_parallel = 12

            [halt]
            on_completeness = false
        "#;
        let config = PipelineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.max_parallel, 12);
        assert!(!config.halt.on_completeness);
        assert!(config.halt.on_topology, "unspecified fields keep their defaults");
    }

    #[test]
    fn rejects_depth_below_minimum() {
        let mut config = PipelineConfig::default();
        config.merkle.min_depth = 0;
        assert!(config.validate().is_err());
    }
}
