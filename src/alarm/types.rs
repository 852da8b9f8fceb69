//! Alarm domain types
//!
//! Defines the per-device alarm state machine value and the event records
//! appended to alarm history.

use crate::domain::{Breach, Metric};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Phase of the per-device alarm state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmPhase {
    /// No metric currently exceeds its threshold
    Clear,
    /// A breach was detected this tick; marks the edge that raises an event.
    /// Logically instantaneous, collapsed into `Locked` within the same
    /// evaluation.
    Breaching,
    /// The alarm is held for the minimum visible duration regardless of
    /// subsequent readings
    Locked,
}

impl fmt::Display for AlarmPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "CLEAR"),
            Self::Breaching => write!(f, "BREACHING"),
            Self::Locked => write!(f, "LOCKED"),
        }
    }
}

/// Current alarm state for one device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlarmState {
    /// Current phase
    pub phase: AlarmPhase,
    /// When the current phase began; `None` for a device that has never
    /// been evaluated
    pub since: Option<SystemTime>,
    /// Metric that triggered the most recent breach, for message
    /// composition
    pub last_breach_metric: Option<Metric>,
}

impl AlarmState {
    /// Initial state for a device that has never been evaluated
    pub fn clear() -> Self {
        Self {
            phase: AlarmPhase::Clear,
            since: None,
            last_breach_metric: None,
        }
    }

    /// Whether the alarm is externally visible as active
    pub fn is_active(&self) -> bool {
        matches!(self.phase, AlarmPhase::Breaching | AlarmPhase::Locked)
    }
}

impl Default for AlarmState {
    fn default() -> Self {
        Self::clear()
    }
}

/// Immutable record of one raised alarm
///
/// Created when a breach locks the alarm, finalized (`cleared_at` set) when
/// the lock expires or the alarm re-arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// Device the alarm belongs to
    pub device_id: String,
    /// Metric that triggered the alarm
    pub metric: Metric,
    /// Observed value at the time of the breach
    pub value: f64,
    /// Threshold that was exceeded
    pub threshold: f64,
    /// Composed human-readable message
    pub message: String,
    /// When the alarm was raised
    pub raised_at: SystemTime,
    /// When the alarm window ended; `None` while the lock is still held
    pub cleared_at: Option<SystemTime>,
}

impl AlarmEvent {
    /// Create an open event from a breach
    pub fn from_breach(device_id: &str, breach: &Breach, raised_at: SystemTime) -> Self {
        let message = format!(
            "{} is at {}, which should be under {}",
            breach.metric, breach.value, breach.max
        );

        Self {
            device_id: device_id.to_string(),
            metric: breach.metric,
            value: breach.value,
            threshold: breach.max,
            message,
            raised_at,
            cleared_at: None,
        }
    }

    /// Whether the event is still open
    pub fn is_open(&self) -> bool {
        self.cleared_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breach(metric: Metric, value: f64, max: f64) -> Breach {
        Breach {
            metric,
            value,
            max,
            overshoot: (value - max) / max,
        }
    }

    #[test]
    fn test_initial_state_has_no_since() {
        let state = AlarmState::clear();
        assert_eq!(state.phase, AlarmPhase::Clear);
        assert!(state.since.is_none());
        assert!(!state.is_active());
    }

    #[test]
    fn test_event_message_composition() {
        let event = AlarmEvent::from_breach(
            "192.168.0.2",
            &breach(Metric::Smoke, 2000.0, 1500.0),
            SystemTime::UNIX_EPOCH,
        );
        assert_eq!(event.message, "smoke is at 2000, which should be under 1500");
        assert!(event.is_open());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(AlarmPhase::Locked.to_string(), "LOCKED");
        assert_eq!(AlarmPhase::Clear.to_string(), "CLEAR");
    }
}
