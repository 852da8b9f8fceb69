//! Configuration system
//!
//! TOML config loading, conversion into validated domain values, and the
//! path resolution for embedding applications: an explicit `ENVMON_CONFIG`
//! path wins, conventional locations are probed next, built-in defaults
//! apply last.

use crate::alarm::{DEFAULT_LOCK_DURATION, DEFAULT_MAX_HISTORY};
use crate::domain::ThresholdSet;
use crate::error::{ConfigError, ThresholdError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct EngineConfig {
    /// General engine settings
    pub general: GeneralConfig,
    /// Threshold bounds per metric
    pub thresholds: ThresholdsConfig,
}

/// General engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Poll interval in milliseconds (floored to 1000 at runtime)
    pub interval_ms: u64,
    /// Minimum visible alarm duration in seconds
    pub lock_duration_secs: u64,
    /// Retained alarm events per device
    pub max_history: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            lock_duration_secs: DEFAULT_LOCK_DURATION.as_secs(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Threshold bounds per metric
///
/// An unset bound leaves the metric unlimited.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Maximum temperature
    pub temperature: Option<f64>,
    /// Maximum smoke value
    pub smoke: Option<f64>,
    /// Maximum humidity percentage
    pub humidity: Option<f64>,
}

impl ThresholdsConfig {
    /// Convert to a validated [`ThresholdSet`]
    pub fn to_threshold_set(&self) -> Result<ThresholdSet, ConfigError> {
        let set = ThresholdSet {
            temperature: self.temperature,
            smoke: self.smoke,
            humidity: self.humidity,
        };

        set.validate().map_err(|e| {
            let metric = match &e {
                ThresholdError::NotFinite { metric, .. }
                | ThresholdError::Negative { metric, .. }
                | ThresholdError::OutOfRange { metric, .. } => metric.clone(),
            };
            ConfigError::InvalidValue {
                key: format!("thresholds.{}", metric),
                message: e.to_string(),
            }
        })?;

        Ok(set)
    }
}

impl EngineConfig {
    /// Poll interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.general.interval_ms)
    }

    /// Alarm lock duration as a duration
    pub fn lock_duration(&self) -> Duration {
        Duration::from_secs(self.general.lock_duration_secs)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the configuration for this process
    ///
    /// A path given via `ENVMON_CONFIG` is authoritative and any error
    /// loading it is returned. Without it the conventional locations are
    /// probed in order, skipping unreadable files, and the built-in
    /// defaults apply when nothing matches.
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("ENVMON_CONFIG") {
            let path = PathBuf::from(path);
            let config = Self::load(&path)?;
            log::info!("loaded config from {} (ENVMON_CONFIG)", path.display());
            return Ok(config);
        }

        // Nearest first: a file next to the embedding application beats the
        // system-wide one.
        for candidate in ["envmon.toml", "/etc/envmon/envmon.toml"] {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(config) => {
                    log::info!("loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => log::warn!("skipping config at {}: {}", path.display(), e),
            }
        }

        Ok(Self::default())
    }
}
