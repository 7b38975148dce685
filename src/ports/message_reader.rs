//! MessageReader port - read side for chat history and conversation lists.

use async_trait::async_trait;

use crate::domain::chat::{ChatMessage, ConversationPartner};
use crate::domain::foundation::UserId;

use super::MessageStoreError;

/// Queries over persisted chat messages.
#[async_trait]
pub trait MessageReader: Send + Sync {
    /// All messages exchanged between `a` and `b`, oldest first.
    async fn history(&self, a: UserId, b: UserId) -> Result<Vec<ChatMessage>, MessageStoreError>;

    /// Every distinct user that `user` has sent a message to or received one
    /// from.
    async fn conversation_partners(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationPartner>, MessageStoreError>;

    /// The most recent message exchanged between `a` and `b`, if any.
    async fn latest_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<ChatMessage>, MessageStoreError>;
}
