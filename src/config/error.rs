//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Training epoch budget must be between 1 and 100000")]
    InvalidEpochBudget,

    #[error("Simulation iteration count must be between 1 and 100000")]
    InvalidIterationCount,

    #[error("Clustering restart count must be between 1 and 1000")]
    InvalidRestartCount,

    #[error("Compute deadline must be between 1 and 600 seconds")]
    InvalidComputeDeadline,
}
