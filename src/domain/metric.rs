//! Metric identity and domain ranges
//!
//! The fleet reports three environmental metrics. Devices may support any
//! subset of them; an unsupported metric is simply absent from a reading.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environmental metric reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Ambient temperature in degrees Celsius
    Temperature,
    /// Smoke concentration (sensor units)
    Smoke,
    /// Relative humidity percentage
    Humidity,
}

impl Metric {
    /// All metrics in priority order, highest first.
    ///
    /// The order doubles as the tie-break when several metrics breach with
    /// the same relative overshoot.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Smoke, Metric::Humidity];

    /// Valid range for a threshold bound on this metric
    ///
    /// Returns `(min, max)` inclusive. Humidity is a percentage; the other
    /// metrics only require a non-negative bound.
    pub fn bound_range(&self) -> (f64, f64) {
        match self {
            Metric::Humidity => (0.0, 100.0),
            Metric::Temperature | Metric::Smoke => (0.0, f64::MAX),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Smoke => write!(f, "smoke"),
            Self::Humidity => write!(f, "humidity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert_eq!(Metric::ALL[0], Metric::Temperature);
        assert_eq!(Metric::ALL[1], Metric::Smoke);
        assert_eq!(Metric::ALL[2], Metric::Humidity);
    }

    #[test]
    fn test_display() {
        assert_eq!(Metric::Smoke.to_string(), "smoke");
        assert_eq!(Metric::Humidity.to_string(), "humidity");
    }

    #[test]
    fn test_humidity_bound_range() {
        let (min, max) = Metric::Humidity.bound_range();
        assert_eq!(min, 0.0);
        assert_eq!(max, 100.0);
    }
}
