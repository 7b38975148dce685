//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `ROOMMATE_CHAT` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use roommate_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod chat;
mod database;
mod error;
mod server;

pub use auth::AuthConfig;
pub use chat::ChatConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Token verification configuration
    pub auth: AuthConfig,

    /// Live session tuning
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROOMMATE_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ROOMMATE_CHAT__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `ROOMMATE_CHAT__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROOMMATE_CHAT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.chat.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "ROOMMATE_CHAT__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        env::set_var("ROOMMATE_CHAT__AUTH__JWT_SECRET", "dev-secret");
    }

    fn clear_env() {
        env::remove_var("ROOMMATE_CHAT__DATABASE__URL");
        env::remove_var("ROOMMATE_CHAT__AUTH__JWT_SECRET");
        env::remove_var("ROOMMATE_CHAT__SERVER__PORT");
        env::remove_var("ROOMMATE_CHAT__SERVER__ENVIRONMENT");
        env::remove_var("ROOMMATE_CHAT__CHAT__OUTBOUND_BUFFER");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.auth.jwt_secret, "dev-secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_and_chat_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.chat.outbound_buffer, 64);
    }

    #[test]
    fn test_overrides_are_applied() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ROOMMATE_CHAT__SERVER__PORT", "3000");
        env::set_var("ROOMMATE_CHAT__SERVER__ENVIRONMENT", "production");
        env::set_var("ROOMMATE_CHAT__CHAT__OUTBOUND_BUFFER", "8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.chat.outbound_buffer, 8);
        // "dev-secret" is too short for production
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var(
            "ROOMMATE_CHAT__DATABASE__URL",
            "postgresql://test@localhost/test",
        );
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
