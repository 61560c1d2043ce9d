//! Authentication and authorization ports.
//!
//! Tokens are issued by an external identity provider; this service only
//! validates them and exposes the typed claims the handlers act on.

use serde::{Deserialize, Serialize};

/// Caller role carried in token claim metadata. Defaults to `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Typed claims extracted from a validated token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    /// Subject identifier assigned by the identity provider.
    pub subject: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service trait for bearer-token operations.
pub trait TokenService: Send + Sync {
    /// Issue a token for a subject. Used by tests and local tooling; in
    /// production tokens come from the identity provider.
    fn issue_token(&self, subject: &str, role: Role) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}
