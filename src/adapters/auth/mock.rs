//! Mock token verifier for testing.
//!
//! Implements the `TokenVerifier` port without any signing keys, so tests can
//! hand out opaque tokens that map straight to users.
//!
//! # Example
//!
//! ```ignore
//! use roommate_chat::adapters::auth::MockTokenVerifier;
//!
//! let verifier = MockTokenVerifier::new()
//!     .with_test_user("token-a", 1)
//!     .with_test_user("token-b", 2);
//!
//! let user = verifier.verify("token-a").await?;
//! assert_eq!(user.id.as_i64(), 1);
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::TokenVerifier;

/// Mock token verifier for testing.
///
/// Stores a map of tokens to users. Tokens not in the map return `InvalidToken`.
///
/// # Panics
///
/// Methods panic if an internal lock is poisoned. Test use only.
#[derive(Debug, Default)]
pub struct MockTokenVerifier {
    /// Map of valid tokens to their associated users
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all verifications (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenVerifier {
    /// Creates a new empty mock verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Adds a valid token for a user identified only by id.
    ///
    /// # Panics
    ///
    /// Panics if `user_id` is not a valid user id.
    pub fn with_test_user(self, token: impl Into<String>, user_id: i64) -> Self {
        let id = UserId::new(user_id).expect("MockTokenVerifier: invalid test user id");
        let user = AuthenticatedUser::new(id, Some(format!("test-user-{}", user_id)));
        self.with_user(token, user)
    }

    /// Forces all verifications to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .expect("MockTokenVerifier: lock poisoned") = Some(error);
        self
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .expect("MockTokenVerifier: lock poisoned") = None;
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.tokens
            .write()
            .expect("MockTokenVerifier: lock poisoned")
            .insert(token.into(), user);
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .expect("MockTokenVerifier: lock poisoned")
            .remove(token);
    }
}

#[async_trait]
impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .expect("MockTokenVerifier: lock poisoned")
            .clone()
        {
            return Err(error);
        }

        self.tokens
            .read()
            .expect("MockTokenVerifier: lock poisoned")
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
