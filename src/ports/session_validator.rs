//! Bearer token check in front of the evaluation API.
//!
//! Staff and students sign in through the campus login service, which hands
//! out HS256 tokens. The subject is the numeric user id and the `roles` claim
//! decides who may force transitions, approve reviews or publish forms.
//! `JwtSessionValidator` is the production implementation; `MockSessionValidator`
//! backs the handler tests.
//!
//! # Security Requirements
//!
//! All implementations MUST validate:
//! - **Signature**: signed with the configured `[auth]` secret
//! - **Issuer (iss)**: issued by the campus login service
//! - **Expiry (exp)**: not expired

use async_trait::async_trait;

use crate::domain::foundation::{AuthenticatedUser, AuthError};

/// Turns a campus access token into the user and roles behind it.
///
/// The auth middleware calls this for every route except `/health` and
/// hands the result to the handlers' role checks.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate issuer and expiry claims
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Check `token` and return the signed-in campus user.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw JWT token (without "Bearer " prefix)
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedUser)` - Token is valid, user extracted from claims
    /// * `Err(AuthError::InvalidToken)` - Token is malformed or signature invalid
    /// * `Err(AuthError::TokenExpired)` - Token signature valid but expired
    /// * `Err(AuthError::ServiceUnavailable)` - Key material unavailable
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
