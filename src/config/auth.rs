//! Authentication configuration

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::str::FromStr;

use super::error::ValidationError;
use super::server::Environment;

/// Token verification configuration (shared-secret JWT)
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret the account service signs access tokens with
    pub jwt_secret: String,

    /// Signing algorithm name
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Parse the configured algorithm, accepting only HMAC variants.
    pub fn algorithm(&self) -> Result<Algorithm, ValidationError> {
        let algorithm = Algorithm::from_str(&self.jwt_algorithm)
            .map_err(|_| ValidationError::UnsupportedJwtAlgorithm(self.jwt_algorithm.clone()))?;
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            _ => Err(ValidationError::UnsupportedJwtAlgorithm(
                self.jwt_algorithm.clone(),
            )),
        }
    }

    /// Validate authentication configuration
    ///
    /// In production the secret must be at least 32 bytes long.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        self.algorithm()?;

        if *environment == Environment::Production && self.jwt_secret.len() < 32 {
            return Err(ValidationError::WeakJwtSecret);
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: default_jwt_algorithm(),
            leeway_secs: default_leeway(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_leeway() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt_algorithm, "HS256");
        assert_eq!(config.leeway_secs, 30);
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_rejects_asymmetric_algorithm() {
        let config = AuthConfig {
            jwt_algorithm: "RS256".to_string(),
            ..config_with_secret("dev-secret")
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::UnsupportedJwtAlgorithm(_))
        ));
    }

    #[test]
    fn test_validation_production_requires_long_secret() {
        let config = config_with_secret("short");
        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Production).is_err());

        let config = config_with_secret("0123456789abcdef0123456789abcdef");
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config_with_secret("super-secret-value");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("REDACTED"));
    }
}
