//! Device readings
//!
//! A reading is one sample from a device: its address, the time it was
//! received, and whichever metric values the device reports. Immutable once
//! produced; the evaluator consumes it the same tick it arrives.

use crate::domain::Metric;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One sample from a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Device network address
    pub device_id: String,
    /// Time the sample was received by this engine
    pub timestamp: SystemTime,
    /// Temperature value, if the device reports one
    pub temperature: Option<f64>,
    /// Smoke value, if the device reports one
    pub smoke: Option<f64>,
    /// Humidity value, if the device reports one
    pub humidity: Option<f64>,
}

impl Reading {
    /// Create an empty reading for a device
    pub fn new(device_id: impl Into<String>, timestamp: SystemTime) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            temperature: None,
            smoke: None,
            humidity: None,
        }
    }

    /// Builder: set the temperature value
    pub fn with_temperature(mut self, value: f64) -> Self {
        self.temperature = Some(value);
        self
    }

    /// Builder: set the smoke value
    pub fn with_smoke(mut self, value: f64) -> Self {
        self.smoke = Some(value);
        self
    }

    /// Builder: set the humidity value
    pub fn with_humidity(mut self, value: f64) -> Self {
        self.humidity = Some(value);
        self
    }

    /// Get the value for a metric, if present
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Smoke => self.smoke,
            Metric::Humidity => self.humidity,
        }
    }

    /// Whether the device reported no metrics at all
    pub fn is_empty(&self) -> bool {
        Metric::ALL.iter().all(|m| self.value(*m).is_none())
    }
}

/// What a poll tick delivered to the evaluator
///
/// A failed or timed-out fetch degrades to `NoData`; it never surfaces as an
/// error on the evaluation path.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// A reading arrived
    Reading(Reading),
    /// Nothing arrived this tick
    NoData,
}

impl Observation {
    /// Get the contained reading, if any
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Self::Reading(r) => Some(r),
            Self::NoData => None,
        }
    }
}
