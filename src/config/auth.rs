//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HS256 secret length accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 campus tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared signing secret of the login service
    pub jwt_secret: SecretString,

    /// Expected `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// In production the secret must be long enough to resist brute force.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.issuer.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__ISSUER"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::WeakJwtSecret(MIN_PRODUCTION_SECRET_LEN));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            issuer: default_issuer(),
            leeway_secs: default_leeway(),
        }
    }
}

fn default_issuer() -> String {
    "campus-login".to_string()
}

fn default_leeway() -> u64 {
    30
}
