//! HTTP DTOs for chat endpoints.
//!
//! Field names are snake_case on the wire, the shape the web client reads.
//! Message ids are UUID strings.

use serde::Serialize;

use crate::domain::chat::{ChatMessage, ConversationSummary};

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One row of `GET /chat/conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummaryResponse {
    pub partner_id: i64,
    pub partner_name: String,
    pub last_message: Option<String>,
    /// RFC 3339.
    pub last_message_time: Option<String>,
    pub is_online: bool,
}

/// One message of `GET /chat/history/:partner_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    /// RFC 3339.
    pub timestamp: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub online_users: usize,
    pub sessions: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// Conversions
// ════════════════════════════════════════════════════════════════════════════

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            partner_id: summary.partner_id.as_i64(),
            partner_name: summary.partner_name,
            last_message: summary.last_message,
            last_message_time: summary
                .last_message_time
                .map(|t| t.as_datetime().to_rfc3339()),
            is_online: summary.is_online,
        }
    }
}

impl From<&ChatMessage> for ChatMessageResponse {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id().to_string(),
            sender_id: message.sender().as_i64(),
            receiver_id: message.receiver().as_i64(),
            content: message.content().to_string(),
            timestamp: message.timestamp().as_datetime().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MessageId, Timestamp, UserId};

    fn uid(raw: i64) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn summary_serializes_in_snake_case() {
        let response = ConversationSummaryResponse::from(ConversationSummary {
            partner_id: uid(2),
            partner_name: "bob".to_string(),
            last_message: Some("hi".to_string()),
            last_message_time: Some(Timestamp::from_unix_secs(0)),
            is_online: true,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("partnerId").is_none());
        assert_eq!(json["partner_id"], 2);
        assert_eq!(json["partner_name"], "bob");
        assert_eq!(json["last_message"], "hi");
        assert_eq!(json["last_message_time"], "1970-01-01T00:00:00+00:00");
        assert_eq!(json["is_online"], true);
    }

    #[test]
    fn summary_without_message_serializes_nulls() {
        let response = ConversationSummaryResponse::from(ConversationSummary {
            partner_id: uid(3),
            partner_name: "user-3".to_string(),
            last_message: None,
            last_message_time: None,
            is_online: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["last_message"].is_null());
        assert!(json["last_message_time"].is_null());
    }

    #[test]
    fn message_response_carries_both_parties() {
        let message = ChatMessage::reconstitute(
            MessageId::new(),
            uid(1),
            uid(2),
            "hello",
            Timestamp::from_unix_secs(60),
        );

        let json = serde_json::to_value(ChatMessageResponse::from(&message)).unwrap();

        assert_eq!(json["sender_id"], 1);
        assert_eq!(json["receiver_id"], 2);
        assert_eq!(json["content"], "hello");
        assert_eq!(json["id"], message.id().to_string());
        assert_eq!(json["timestamp"], "1970-01-01T00:01:00+00:00");
    }

    #[test]
    fn health_uses_snake_case_counters() {
        let json = serde_json::to_value(HealthResponse {
            status: "ok",
            online_users: 3,
            sessions: 4,
        })
        .unwrap();

        assert_eq!(json["online_users"], 3);
        assert_eq!(json["sessions"], 4);
    }
}
