//! Periodic polling
//!
//! One scheduler per watched device view; see [`scheduler::PollScheduler`].

pub mod scheduler;

pub use scheduler::{PollScheduler, UNREACHABLE_AFTER_FAILURES};
