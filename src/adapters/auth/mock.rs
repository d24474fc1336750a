//! Mock session validator for testing.
//!
//! # Example
//!
//! ```ignore
//! use campus_eval::adapters::auth::MockSessionValidator;
//! use campus_eval::domain::foundation::Role;
//!
//! let validator = MockSessionValidator::new()
//!     .with_test_user("admin-token", 1, [Role::Admin]);
//!
//! let result = validator.validate("admin-token").await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations
    force_error: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(mut self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        if let Ok(tokens) = self.tokens.get_mut() {
            tokens.insert(token.into(), user);
        }
        self
    }

    /// Adds a valid token for a user with the given id and roles.
    pub fn with_test_user(
        self,
        token: impl Into<String>,
        id: i64,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        match UserId::new(id) {
            Ok(user_id) => {
                let user = AuthenticatedUser::new(user_id, format!("测试用户{}", id), roles);
                self.with_user(token, user)
            }
            Err(_) => self,
        }
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.force_error = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = &self.force_error {
            return Err(error.clone());
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::ServiceUnavailable("mock token store poisoned".into()))?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
