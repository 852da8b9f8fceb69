//! Unified error types for envmon
//!
//! This module defines all error types used throughout the engine.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level engine error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from threshold validation
    #[error("Threshold error: {0}")]
    Threshold(#[from] ThresholdError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the reading source
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from threshold validation
///
/// A rejected set leaves the store unchanged; there is no partial apply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThresholdError {
    /// Bound is NaN or infinite
    #[error("Invalid threshold for {metric}: {value} is not a finite number")]
    NotFinite { metric: String, value: f64 },

    /// Bound is below zero
    #[error("Invalid threshold for {metric}: {value} (must be non-negative)")]
    Negative { metric: String, value: f64 },

    /// Bound is outside the metric's domain range
    #[error("Invalid threshold for {metric}: {value} (valid range: {min}-{max})")]
    OutOfRange {
        metric: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors from the reading source
///
/// All of these are transient from the scheduler's point of view: a failed
/// tick degrades to a no-data observation and polling continues.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (connection refused, reset, etc.)
    #[error("Transport failure for device {device}: {message}")]
    Transport { device: String, message: String },

    /// The fetch did not complete in time
    #[error("Fetch timed out for device {0}")]
    Timeout(String),

    /// The response body could not be decoded
    #[error("Failed to decode record payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
