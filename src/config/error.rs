//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Model client could not be created: {0}")]
    ClientSetup(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid model request timeout")]
    InvalidTimeout,

    #[error("Model name must not be empty")]
    EmptyModel,

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("max_loops must be at least 1")]
    InvalidMaxLoops,

    #[error("min_loops_for_closure exceeds max_loops")]
    MinLoopsExceedMax,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
