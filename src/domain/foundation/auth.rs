//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a JWT token.
//! Any token issuer can populate them via the `SessionValidator` port.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{UserId, ValidationError};

/// Campus roles carried in the token's `roles` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    GroupMember,
    GroupLeader,
    Counselor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::GroupMember => "GROUP_MEMBER",
            Role::GroupLeader => "GROUP_LEADER",
            Role::Counselor => "COUNSELOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Accepts both `ADMIN` and Spring-style `ROLE_ADMIN`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("ROLE_").unwrap_or(s);
        match s.to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "GROUP_MEMBER" => Ok(Role::GroupMember),
            "GROUP_LEADER" => Ok(Role::GroupLeader),
            "COUNSELOR" => Ok(Role::Counselor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Authenticated user extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Internal user id (`sub` claim).
    pub id: UserId,

    /// Display name, used as the sender of notifications.
    pub name: String,

    pub roles: BTreeSet<Role>,

    /// Department (学院) the user belongs to or manages.
    pub department: Option<String>,

    /// Squad (中队) the user belongs to or leads.
    pub squad: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, name: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id,
            name: name.into(),
            roles: roles.into_iter().collect(),
            department: None,
            squad: None,
        }
    }

    /// Attaches the organizational scope of the user.
    pub fn with_scope(mut self, department: impl Into<String>, squad: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self.squad = Some(squad.into());
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// True if the user holds at least one of `allowed`.
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|r| self.roles.contains(r))
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// User exists but lacks required permissions for this action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
