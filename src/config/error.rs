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
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size must be between 1 and {0}")]
    InvalidPoolSize(u32),

    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedJwtAlgorithm(String),

    #[error("JWT secret must be at least 32 bytes in production")]
    WeakJwtSecret,

    #[error("Outbound buffer must be greater than zero")]
    InvalidOutboundBuffer,

    #[error("Maximum message length must be greater than zero")]
    InvalidMessageLength,

    #[error("Registry shard count must be between 1 and 1024")]
    InvalidShardCount,
}
