//! Service layer
//!
//! The engine facade consumed by the presentation layer.

pub mod engine;

pub use engine::MonitorEngine;
