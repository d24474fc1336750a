//! HTTP listener settings for the evaluation API.
//!
//! Loaded from the `[server]` section or `CAMPUS_EVAL__SERVER__*` variables.
//! The scheduler shares the process, so `log_level` also governs job logs.

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;

/// Where the evaluation API listens and how it treats requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address, `0.0.0.0` behind the campus gateway
    #[serde(default = "default_host")]
    pub host: String,

    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment tier; production enforces a strong JWT secret
    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-request timeout in seconds, 1 to 300
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Comma-separated origins of the evaluation web front end
    pub cors_origins: Option<String>,
}

/// Deployment tier
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    /// Bind address for the listener, rejecting hosts that are not IP literals
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidHost(self.host.clone()))
    }

    /// True on the production tier
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Front-end origins for the CORS layer, empty when unset
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_ref()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Rejects port 0, unparseable hosts and out-of-range timeouts
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr()?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_log_level() -> String {
    "info,campus_eval=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Default::default()
        };
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validation_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidHost(_))));
    }

    #[test]
    fn test_default_log_level_targets_crate() {
        assert!(ServerConfig::default().log_level.contains("campus_eval=debug"));
    }

    #[test]
    fn test_is_production() {
        let mut config = ServerConfig::default();
        assert!(!config.is_production());

        config.environment = Environment::Production;
        assert!(config.is_production());
    }

    #[test]
    fn test_cors_origins_parsing() {
        let config = ServerConfig {
            cors_origins: Some("http://localhost:8081, http://eval.campus.edu".to_string()),
            ..Default::default()
        };
        let origins = config.cors_origins_list();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:8081");
        assert_eq!(origins[1], "http://eval.campus.edu");
    }

    #[test]
    fn test_validation_invalid_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = ServerConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            request_timeout_secs: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
