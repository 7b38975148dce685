//! ListConversationsHandler - Query handler for a user's recent chats.
//!
//! One summary per partner the user ever exchanged a message with, carrying
//! the latest message and whether the partner is connected right now.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::domain::chat::{sort_by_recency, ConversationPartner, ConversationSummary};
use crate::domain::foundation::UserId;
use crate::ports::{MessageReader, MessageStoreError, PresenceChecker};

/// Query to list the conversations of a user.
#[derive(Debug, Clone)]
pub struct ListConversationsQuery {
    /// The requesting user.
    pub user_id: UserId,
}

/// Result of a successful conversation list query, most recent first.
pub type ListConversationsResult = Vec<ConversationSummary>;

/// Handler for building the conversation list.
///
/// Nothing is cached: partners and last messages come from storage and
/// presence from the live registry on every call.
pub struct ListConversationsHandler {
    reader: Arc<dyn MessageReader>,
    presence: Arc<dyn PresenceChecker>,
}

impl ListConversationsHandler {
    pub fn new(reader: Arc<dyn MessageReader>, presence: Arc<dyn PresenceChecker>) -> Self {
        Self { reader, presence }
    }

    pub async fn handle(
        &self,
        query: ListConversationsQuery,
    ) -> Result<ListConversationsResult, MessageStoreError> {
        let user = query.user_id;
        let partners = self.reader.conversation_partners(user).await?;

        let mut summaries =
            try_join_all(partners.into_iter().map(|partner| self.summarize(user, partner)))
                .await?;
        sort_by_recency(&mut summaries);

        tracing::debug!(
            user_id = %user,
            conversations = summaries.len(),
            "Built conversation list"
        );
        Ok(summaries)
    }

    async fn summarize(
        &self,
        user: UserId,
        partner: ConversationPartner,
    ) -> Result<ConversationSummary, MessageStoreError> {
        let latest = self.reader.latest_between(user, partner.id).await?;

        Ok(ConversationSummary {
            partner_id: partner.id,
            partner_name: partner.display_name,
            last_message: latest.as_ref().map(|m| m.content().to_string()),
            last_message_time: latest.as_ref().map(|m| m.timestamp()),
            is_online: self.presence.is_online(&partner.id),
        })
    }
}
