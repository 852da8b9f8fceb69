//! envmon - threshold monitoring and alarm engine
//!
//! This library polls a fleet of environmental sensor devices (temperature,
//! smoke, humidity), evaluates readings against configured thresholds, and
//! maintains per-device alarm state with a minimum-duration lock so a
//! transient breach stays visible for at least the configured hold time.
//!
//! # Modules
//!
//! - [`alarm`]: Alarm state machine, evaluation, and storage
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`poll`]: Periodic poll scheduling
//! - [`source`]: Device reading source abstraction
//! - [`services`]: The engine facade

pub mod alarm;
pub mod config;
pub mod domain;
pub mod error;
pub mod poll;
pub mod services;
pub mod source;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
pub use services::MonitorEngine;
