//! Errors raised while assembling `AppConfig`.
//!
//! Startup aborts on either kind, before the pool or the scheduler starts.

use thiserror::Error;

/// Failure to read settings or to accept them
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// A setting that parsed but cannot be used.
///
/// Each variant names the section it comes from: `[server]`, `[database]`,
/// `[auth]` or `[scheduler]`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    /// `[server]`
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host: {0}")]
    InvalidHost(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    /// `[database]`
    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    /// `[auth]`
    #[error("JWT secret must be at least {0} bytes in production")]
    WeakJwtSecret(usize),

    /// `[scheduler]`
    #[error("Invalid daily run time {hour:02}:{minute:02}")]
    InvalidScheduleTime { hour: u32, minute: u32 },

    #[error("Poll interval must be positive")]
    InvalidInterval,
}
