//! Token verification port.
//!
//! The chat service never issues tokens; it only asks whether a token
//! presented by a client is genuine and which user it belongs to.
//!
//! # Contract
//!
//! Implementations must:
//! - Validate the token signature
//! - Reject expired tokens with `AuthError::TokenExpired`
//! - Reject malformed or tampered tokens with `AuthError::InvalidToken`
//! - Return `AuthError::ServiceUnavailable` for transient errors

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Verifies access tokens and extracts the user identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw token (without any "Bearer " prefix).
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;

    struct FixedVerifier {
        tokens: HashMap<String, AuthenticatedUser>,
    }

    #[async_trait]
    impl TokenVerifier for FixedVerifier {
        async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
            self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn verifier_returns_user_for_known_token() {
        let user = AuthenticatedUser::new(UserId::new(3).unwrap(), Some("carol".into()));
        let verifier = FixedVerifier {
            tokens: HashMap::from([("tok".to_string(), user.clone())]),
        };

        assert_eq!(verifier.verify("tok").await.unwrap(), user);
        assert_eq!(verifier.verify("nope").await, Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_verifier_trait_is_object_safe_and_send_sync() {
        fn _assert_trait_object(_: &dyn TokenVerifier) {}
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<std::sync::Arc<dyn TokenVerifier>>();
    }
}
