//! HS256 JWT adapter for session validation.
//!
//! Campus tokens are issued by the login service and signed with a shared
//! secret. This adapter validates:
//!
//! - **Signature**: HS256 with the configured secret
//! - **Issuer (iss)**: Must match the configured issuer
//! - **Expiry (exp)**: Must be in the future, within the configured leeway
//!
//! and maps the claims to a domain [`AuthenticatedUser`].

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Configuration for the JWT adapter.
#[derive(Debug, Clone)]
pub struct JwtValidatorConfig {
    pub secret: SecretString,
    pub issuer: String,
    pub leeway_secs: u64,
}

impl JwtValidatorConfig {
    pub fn new(secret: SecretString, issuer: impl Into<String>) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            leeway_secs: 30,
        }
    }

    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }
}

/// Claims carried by campus access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct CampusClaims {
    /// Internal user id, as a decimal string.
    pub sub: String,

    pub iss: String,

    /// Expiry timestamp (Unix epoch seconds)
    pub exp: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub department: Option<String>,

    #[serde(default)]
    pub squad: Option<String>,
}

/// Validates HS256-signed campus tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: &JwtValidatorConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.validate_exp = true;
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
        }
    }

    fn to_user(claims: CampusClaims) -> Result<AuthenticatedUser, AuthError> {
        let id = claims
            .sub
            .parse::<i64>()
            .ok()
            .and_then(|id| UserId::new(id).ok())
            .ok_or_else(|| {
                tracing::warn!("Invalid user ID in token: {}", claims.sub);
                AuthError::InvalidToken
            })?;

        let roles = claims.roles.iter().filter_map(|r| match r.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::debug!("Ignoring unknown role in token: {}", r);
                None
            }
        });

        let mut user = AuthenticatedUser::new(id, claims.name.clone().unwrap_or_default(), roles);
        user.department = claims.department;
        user.squad = claims.squad;
        Ok(user)
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<CampusClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::warn!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        Self::to_user(data.claims)
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}
