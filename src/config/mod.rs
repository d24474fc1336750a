//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CAMPUS_EVAL` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use campus_eval::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod auth;
mod database;
mod error;
mod scheduler;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use scheduler::SchedulerConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Authentication configuration (HS256 tokens)
    pub auth: AuthConfig,

    /// Background review and publicity jobs
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CAMPUS_EVAL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CAMPUS_EVAL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CAMPUS_EVAL__DATABASE__URL=...` -> `database.url = ...`
    /// - `CAMPUS_EVAL__SCHEDULER__REVIEW_RUN_HOUR=2` -> `scheduler.review_run_hour = 2`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CAMPUS_EVAL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.scheduler.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
