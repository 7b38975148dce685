//! PostgreSQL pool settings

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// Connection settings for the message store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// How long a query waits for a free connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply `migrations/` before serving
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect(&self.url)
            .await
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        let scheme = self.url.split_once("://").map(|(scheme, _)| scheme);
        if !matches!(scheme, Some("postgres" | "postgresql")) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool_size == 0 || self.pool_size > MAX_POOL_SIZE {
            return Err(ValidationError::InvalidPoolSize(MAX_POOL_SIZE));
        }
        Ok(())
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            pool_size: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: false,
        }
    }

    #[test]
    fn accepts_both_postgres_schemes() {
        assert!(with_url("postgres://chat@localhost/roommates").validate().is_ok());
        assert!(with_url("postgresql://chat@localhost/roommates").validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_foreign_urls() {
        assert!(matches!(
            with_url("  ").validate(),
            Err(ValidationError::MissingRequired(_))
        ));
        assert!(matches!(
            with_url("mysql://localhost/db").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
        assert!(matches!(
            with_url("postgres").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn pool_size_must_be_within_bounds() {
        for size in [0, MAX_POOL_SIZE + 1] {
            let config = DatabaseConfig {
                pool_size: size,
                ..with_url("postgres://localhost/chat")
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidPoolSize(_))
            ));
        }
    }
}
