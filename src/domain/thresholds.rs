//! Threshold configuration
//!
//! A threshold is an upper bound per metric: a reading breaches when its
//! value is strictly greater than the bound. The set is validated and
//! replaced as a whole; there is no partial update.

use crate::domain::{Metric, Reading};
use crate::error::ThresholdError;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

/// Minimum poll interval; anything shorter is clamped to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default poll interval when no configuration is supplied
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Upper bounds per metric
///
/// An unset bound means the metric is unlimited and can never breach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThresholdSet {
    /// Maximum temperature before breaching
    pub temperature: Option<f64>,
    /// Maximum smoke value before breaching
    pub smoke: Option<f64>,
    /// Maximum humidity before breaching
    pub humidity: Option<f64>,
}

/// A metric value exceeding its bound, with the relative overshoot used to
/// rank simultaneous breaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breach {
    /// Metric that breached
    pub metric: Metric,
    /// Observed value
    pub value: f64,
    /// Configured bound
    pub max: f64,
    /// `(value - max) / max`; infinite when the bound is zero
    pub overshoot: f64,
}

impl ThresholdSet {
    /// Get the bound for a metric, if set
    pub fn bound(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Smoke => self.smoke,
            Metric::Humidity => self.humidity,
        }
    }

    /// Builder: set the bound for a metric
    pub fn with_bound(mut self, metric: Metric, max: f64) -> Self {
        match metric {
            Metric::Temperature => self.temperature = Some(max),
            Metric::Smoke => self.smoke = Some(max),
            Metric::Humidity => self.humidity = Some(max),
        }
        self
    }

    /// Validate every bound in the set
    ///
    /// Bounds must be finite and non-negative; humidity must additionally
    /// stay within its percentage range. The first offending bound is
    /// reported, in metric priority order.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for metric in Metric::ALL {
            let Some(value) = self.bound(metric) else {
                continue;
            };

            if !value.is_finite() {
                return Err(ThresholdError::NotFinite {
                    metric: metric.to_string(),
                    value,
                });
            }
            if value < 0.0 {
                return Err(ThresholdError::Negative {
                    metric: metric.to_string(),
                    value,
                });
            }

            let (min, max) = metric.bound_range();
            if value < min || value > max {
                return Err(ThresholdError::OutOfRange {
                    metric: metric.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Find the worst breach in a reading, if any
    ///
    /// Comparisons are strict: a value equal to its bound does not breach.
    /// Missing values and unset bounds never breach. When several metrics
    /// breach at once, the largest relative overshoot wins; ties keep the
    /// higher-priority metric.
    pub fn worst_breach(&self, reading: &Reading) -> Option<Breach> {
        let mut worst: Option<Breach> = None;

        for metric in Metric::ALL {
            let (Some(value), Some(max)) = (reading.value(metric), self.bound(metric)) else {
                continue;
            };
            if value <= max {
                continue;
            }

            let overshoot = if max > 0.0 {
                (value - max) / max
            } else {
                f64::INFINITY
            };

            let candidate = Breach {
                metric,
                value,
                max,
                overshoot,
            };

            // Strict comparison keeps the earlier (higher-priority) metric
            // on a tie.
            match worst {
                Some(w) if candidate.overshoot <= w.overshoot => {}
                _ => worst = Some(candidate),
            }
        }

        worst
    }
}

/// Shared threshold and interval configuration
///
/// Reads hand out whole-value snapshots; writes replace the whole value
/// atomically, so evaluations never observe a half-applied set.
#[derive(Debug)]
pub struct ThresholdStore {
    thresholds: RwLock<ThresholdSet>,
    interval: RwLock<Duration>,
}

impl ThresholdStore {
    /// Create a store with the given initial configuration
    ///
    /// The interval is clamped to [`MIN_POLL_INTERVAL`].
    pub fn new(thresholds: ThresholdSet, interval: Duration) -> Self {
        Self {
            thresholds: RwLock::new(thresholds),
            interval: RwLock::new(interval.max(MIN_POLL_INTERVAL)),
        }
    }

    /// Snapshot of the current threshold set
    pub fn get(&self) -> ThresholdSet {
        *self.thresholds.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the threshold set
    ///
    /// The new set is validated first; on failure the store is unchanged.
    /// Evaluations pick up the new set from their next snapshot.
    pub fn set(&self, thresholds: ThresholdSet) -> Result<(), ThresholdError> {
        thresholds.validate()?;
        *self.thresholds.write().unwrap_or_else(|e| e.into_inner()) = thresholds;
        Ok(())
    }

    /// Current poll interval
    pub fn interval(&self) -> Duration {
        *self.interval.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the poll interval, clamped to [`MIN_POLL_INTERVAL`]
    ///
    /// Returns the clamped value actually stored.
    pub fn set_interval(&self, interval: Duration) -> Duration {
        let clamped = interval.max(MIN_POLL_INTERVAL);
        *self.interval.write().unwrap_or_else(|e| e.into_inner()) = clamped;
        clamped
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(ThresholdSet::default(), DEFAULT_POLL_INTERVAL)
    }
}
