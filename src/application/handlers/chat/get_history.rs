//! GetChatHistoryHandler - Query handler for the messages between two users.

use std::sync::Arc;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::UserId;
use crate::ports::{MessageReader, MessageStoreError};

/// Query for the conversation between the requester and one partner.
#[derive(Debug, Clone)]
pub struct GetChatHistoryQuery {
    /// The requesting user.
    pub user_id: UserId,
    /// The other side of the conversation.
    pub partner_id: UserId,
}

/// Messages in either direction, oldest first.
pub type GetChatHistoryResult = Vec<ChatMessage>;

pub struct GetChatHistoryHandler {
    reader: Arc<dyn MessageReader>,
}

impl GetChatHistoryHandler {
    pub fn new(reader: Arc<dyn MessageReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetChatHistoryQuery,
    ) -> Result<GetChatHistoryResult, MessageStoreError> {
        let mut messages = self.reader.history(query.user_id, query.partner_id).await?;
        // Stable, so equal timestamps keep storage order.
        messages.sort_by_key(|m| m.timestamp());
        Ok(messages)
    }
}
