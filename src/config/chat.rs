//! Real-time chat configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Tuning for live sessions and the session registry
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Outbound queue capacity per session; a full queue evicts the session
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Maximum message length in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Number of registry shards (users hash into shards)
    #[serde(default = "default_registry_shards")]
    pub registry_shards: usize,

    /// Time allowed for sessions to flush and close on shutdown
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl ChatConfig {
    /// Get shutdown grace period as Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_buffer == 0 {
            return Err(ValidationError::InvalidOutboundBuffer);
        }
        if self.max_message_length == 0 {
            return Err(ValidationError::InvalidMessageLength);
        }
        if self.registry_shards == 0 || self.registry_shards > 1024 {
            return Err(ValidationError::InvalidShardCount);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            max_message_length: default_max_message_length(),
            registry_shards: default_registry_shards(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_max_message_length() -> usize {
    4000
}

fn default_registry_shards() -> usize {
    16
}

fn default_shutdown_grace() -> u64 {
    5
}
