//! Failures while loading or checking configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("configuration rejected: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A value that parsed but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingRequired(&'static str),

    #[error("'{0}' is not a bindable socket address")]
    InvalidAddress(String),

    #[error("port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("database URL must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("database pool minimum is larger than its maximum")]
    InvalidPoolSize,

    #[error("database pool is limited to 100 connections")]
    PoolSizeTooLarge,

    #[error("gameplay setting '{0}' must be greater than zero")]
    ZeroGameplaySetting(&'static str),
}
