//! MessageRepository port - durable write side for chat messages.

use async_trait::async_trait;

use crate::domain::chat::ChatMessage;

/// Errors raised by message storage adapters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MessageStoreError {
    /// Database communication error
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back to a domain value
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

/// Stores chat messages.
///
/// A successful `save` means the message is durable; callers forward the
/// message to live sessions only after it returns `Ok`.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist one message.
    async fn save(&self, message: &ChatMessage) -> Result<(), MessageStoreError>;
}
