//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates Bearer tokens and injects user into extensions
//! - `RequireAuth` - Extractor that requires authentication, with role checks
//!
//! # Architecture
//!
//! The middleware uses the `SessionValidator` port, so the HS256 validator
//! and the test mock plug in the same way.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Authentication middleware that validates Bearer tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the `SessionValidator` port
/// 3. On success, injects `AuthenticatedUser` into request extensions
/// 4. On missing token, continues without injecting (public routes such as `/health`)
/// 5. On invalid token, returns 401 Unauthorized
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (StatusCode::SERVICE_UNAVAILABLE, "Authentication service unavailable")
                }
                AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            };

            (
                status,
                Json(serde_json::json!({
                    "error": message,
                    "code": "AUTH_ERROR"
                })),
            )
                .into_response()
        }
    }
}

/// Extractor that requires authentication.
///
/// If no user is in the request extensions (i.e., auth middleware didn't
/// successfully validate a token), returns 401 Unauthorized.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("你好, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl RequireAuth {
    /// Passes the user through when they hold one of `allowed`.
    pub fn require_any(self, allowed: &[Role]) -> Result<AuthenticatedUser, AuthRejection> {
        if self.0.has_any_role(allowed) {
            Ok(self.0)
        } else {
            tracing::warn!(user_id = %self.0.id, "Rejected request lacking role");
            Err(AuthRejection::Forbidden)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
    /// Authenticated, but without a role the route needs.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            AuthRejection::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required", "UNAUTHENTICATED")
            }
            AuthRejection::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions", "FORBIDDEN"),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}
