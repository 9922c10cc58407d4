//! Hierarchical configuration loader, grounded on the teacher's
//! `ConfigLoader` (`infrastructure/config/loader.rs`): programmatic defaults,
//! then project YAML, then project-local YAML overrides, then environment
//! variables (highest precedence).

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid retry.max_attempts: {0}, must be >= 1")]
    InvalidMaxAttempts(u32),

    #[error("invalid retry backoff: base_delay_ms ({0}) must be < max_delay_ms ({1})")]
    InvalidBackoff(u64, u64),

    #[error("invalid circuit_breaker.failure_threshold: {0}, must be >= 1")]
    InvalidFailureThreshold(u32),

    #[error("invalid rate_limit.requests_per_second: {0}, must be positive")]
    InvalidRateLimit(f64),

    #[error("invalid rate_limit.burst_size: {0}, must be >= 1")]
    InvalidBurstSize(u32),

    #[error("invalid logging.level: {0}, must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid logging.format: {0}, must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("invalid monitor.history_capacity: {0}, must be >= 1")]
    InvalidHistoryCapacity(usize),
}

/// Loads `Config` with hierarchical merging.
///
/// Precedence (lowest to highest):
/// 1. Programmatic defaults (`Config::default()`)
/// 2. `.marcus/config.yaml` (project config)
/// 3. `.marcus/local.yaml` (project-local overrides, optional)
/// 4. `MARCUS_*` environment variables (highest priority)
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".marcus/config.yaml"))
            .merge(Yaml::file(".marcus/local.yaml"))
            .merge(Env::prefixed("MARCUS_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(0));
        }
        if config.retry.base_delay_ms >= config.retry.max_delay_ms {
            return Err(ConfigError::InvalidBackoff(config.retry.base_delay_ms, config.retry.max_delay_ms));
        }
        if config.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::InvalidFailureThreshold(0));
        }
        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(config.rate_limit.requests_per_second));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(0));
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if config.monitor.history_capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity(0));
        }
        Ok(())
    }
}
