//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a verified
//! access token. They have **no external dependencies** - any token issuer
//! can populate them through the `TokenVerifier` port.

use super::UserId;
use thiserror::Error;

/// Authenticated user extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user identifier carried by the token.
    pub id: UserId,

    /// Username from the token subject, if present.
    pub username: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, username: Option<String>) -> Self {
        Self { id, username }
    }

    /// Returns the username, or a generated label when the token had none.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| format!("user-{}", self.id))
    }
}

/// Authentication errors that can occur during token verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The token is valid but names a different user than the one claimed.
    #[error("Token does not belong to user {claimed}")]
    IdentityMismatch { claimed: UserId, verified: UserId },

    /// The verification backend is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
