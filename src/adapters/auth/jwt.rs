//! Shared-secret JWT verifier.
//!
//! Verifies HMAC-signed tokens issued by the account service. Tokens carry
//! the username in `sub`, the numeric user id in `id` and an `exp` claim:
//!
//! ```text
//! { "sub": "alice", "id": 42, "exp": 1735689600 }
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::TokenVerifier;

/// Claims we read from an access token.
#[derive(Debug, Deserialize)]
struct AccessClaims {
    /// Username.
    sub: Option<String>,
    /// Numeric user id.
    id: Option<i64>,
}

/// Verifies HS256/HS384/HS512 access tokens against a shared secret.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Creates a verifier for the given secret and algorithm.
    pub fn new(secret: &SecretString, algorithm: Algorithm, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Creates a verifier from validated auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let algorithm = config.algorithm().map_err(|e| {
            tracing::error!("Unusable JWT algorithm: {}", e);
            AuthError::service_unavailable("JWT verifier misconfigured")
        })?;
        let secret = SecretString::new(config.jwt_secret.clone());
        Ok(Self::new(&secret, algorithm, config.leeway_secs))
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidSignature => {
                        tracing::warn!("Token signature mismatch");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;

        let claims = token_data.claims;
        let raw_id = claims.id.ok_or_else(|| {
            tracing::warn!("Token missing id claim");
            AuthError::InvalidToken
        })?;
        let user_id = UserId::new(raw_id).map_err(|_| {
            tracing::warn!("Invalid user id in token: {}", raw_id);
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.sub))
    }
}

impl std::fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}
