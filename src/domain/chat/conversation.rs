//! Conversation summaries - the derived "recent chats" view.

use std::cmp::Ordering;

use crate::domain::foundation::{Timestamp, UserId};

/// A user the requester has exchanged at least one message with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPartner {
    pub id: UserId,
    pub display_name: String,
}

/// One row of the conversation list.
///
/// Recomputed on every query; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub partner_id: UserId,
    pub partner_name: String,
    pub last_message: Option<String>,
    pub last_message_time: Option<Timestamp>,
    pub is_online: bool,
}

/// Orders summaries most-recent first.
///
/// Summaries without a last message go last. Ties fall back to ascending
/// partner id so the output is deterministic.
pub fn sort_by_recency(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| match (a.last_message_time, b.last_message_time) {
        (Some(ta), Some(tb)) => tb.cmp(&ta).then(a.partner_id.cmp(&b.partner_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.partner_id.cmp(&b.partner_id),
    });
}
