//! Domain models for envmon
//!
//! This module contains all domain types with validation.
//! Types are validated on construction (fail-fast pattern).

pub mod metric;
pub mod reading;
pub mod thresholds;

pub use metric::Metric;
pub use reading::{Observation, Reading};
pub use thresholds::{
    Breach, ThresholdSet, ThresholdStore, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
