//! Alarm state machine and storage
//!
//! Provides breach evaluation with a minimum-duration alarm lock and
//! per-device state/history storage.

mod evaluator;
mod store;
mod types;

pub use evaluator::{evaluate, AlarmAction, Evaluation, DEFAULT_LOCK_DURATION};
pub use store::{AlarmStateStore, AlarmSubscriber, DEFAULT_MAX_HISTORY};
pub use types::{AlarmEvent, AlarmPhase, AlarmState};
