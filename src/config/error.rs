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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Time limit warning delay must be greater than zero")]
    InvalidWarningDelay,

    #[error("Invalid {0} timeout")]
    InvalidTimeout(&'static str),

    #[error("Invalid scoring endpoint URL format")]
    InvalidScoringEndpoint,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Recovery max_attempts must be at least 1")]
    InvalidMaxAttempts,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
