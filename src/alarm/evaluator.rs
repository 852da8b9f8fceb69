//! Alarm state machine evaluation
//!
//! Pure and deterministic: given an observation, a threshold snapshot and
//! the device's current alarm state, produce the next state and the event
//! action to apply to history. No clock access; `now` is an argument so the
//! machine can be tested without a running scheduler.

use crate::alarm::types::{AlarmEvent, AlarmPhase, AlarmState};
use crate::domain::{Observation, ThresholdSet};
use std::time::{Duration, SystemTime};

/// Minimum visible alarm duration once raised
pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_secs(60);

/// History action produced by one evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmAction {
    /// A new alarm was raised; append the open event
    Raised(AlarmEvent),
    /// The lock expired with the condition gone; finalize the open event
    Cleared { at: SystemTime },
    /// The lock expired with the condition persisting; finalize the open
    /// event and append a fresh one
    Rearmed { at: SystemTime, event: AlarmEvent },
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Next alarm state for the device
    pub state: AlarmState,
    /// History action to apply, if any
    pub action: Option<AlarmAction>,
}

impl Evaluation {
    fn unchanged(state: AlarmState) -> Self {
        Self {
            state,
            action: None,
        }
    }
}

/// Evaluate one observation for a device
///
/// State machine:
/// - `Clear` + breaching reading → `Locked` (through the instantaneous
///   `Breaching` edge), raising an event.
/// - `Locked` holds for at least `lock_duration` no matter what arrives.
/// - At expiry, the next real reading decides: still breaching → re-arm
///   with a fresh event; back to normal → `Clear`, finalizing the event.
/// - No-data observations never raise, clear, or extend anything.
pub fn evaluate(
    device_id: &str,
    prev: &AlarmState,
    observation: &Observation,
    thresholds: &ThresholdSet,
    now: SystemTime,
    lock_duration: Duration,
) -> Evaluation {
    match prev.phase {
        AlarmPhase::Clear => {
            let Some(reading) = observation.reading() else {
                return Evaluation::unchanged(*prev);
            };

            match thresholds.worst_breach(reading) {
                Some(breach) => {
                    let event = AlarmEvent::from_breach(device_id, &breach, now);
                    Evaluation {
                        state: AlarmState {
                            phase: AlarmPhase::Locked,
                            since: Some(now),
                            last_breach_metric: Some(breach.metric),
                        },
                        action: Some(AlarmAction::Raised(event)),
                    }
                }
                None => Evaluation::unchanged(AlarmState {
                    phase: AlarmPhase::Clear,
                    since: prev.since.or(Some(now)),
                    last_breach_metric: prev.last_breach_metric,
                }),
            }
        }

        // A persisted Breaching state means the raising edge already
        // happened; hold it like a lock that started at `since`.
        AlarmPhase::Breaching | AlarmPhase::Locked => {
            let elapsed = prev
                .since
                .and_then(|since| now.duration_since(since).ok())
                .unwrap_or(Duration::ZERO);

            if elapsed < lock_duration {
                return Evaluation::unchanged(*prev);
            }

            // Lock has run its course; only a real reading decides what
            // happens next.
            let Some(reading) = observation.reading() else {
                return Evaluation::unchanged(*prev);
            };

            match thresholds.worst_breach(reading) {
                Some(breach) => {
                    let event = AlarmEvent::from_breach(device_id, &breach, now);
                    Evaluation {
                        state: AlarmState {
                            phase: AlarmPhase::Locked,
                            since: Some(now),
                            last_breach_metric: Some(breach.metric),
                        },
                        action: Some(AlarmAction::Rearmed { at: now, event }),
                    }
                }
                None => Evaluation {
                    state: AlarmState {
                        phase: AlarmPhase::Clear,
                        since: Some(now),
                        last_breach_metric: prev.last_breach_metric,
                    },
                    action: Some(AlarmAction::Cleared { at: now }),
                },
            }
        }
    }
}
