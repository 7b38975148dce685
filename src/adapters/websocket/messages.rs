//! WebSocket message types for direct chat.
//!
//! Defines the protocol between server and connected clients:
//! - Client → Server: `{"to": <userId>, "msg": <text>}`
//! - Server → Client: `{"sender": <userId>, "msg": <text>}` or `{"error": <text>}`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UserId, ValidationError};

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
///
/// Serialized untagged so the wire shape is exactly the inner struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// A chat message forwarded from another user.
    Chat(ChatEnvelope),

    /// Acknowledgment that the last frame was not accepted.
    Error(ErrorAck),
}

impl ServerMessage {
    /// Build a forwarded-message envelope.
    pub fn chat(sender: UserId, msg: impl Into<String>) -> Self {
        ServerMessage::Chat(ChatEnvelope {
            sender,
            msg: msg.into(),
        })
    }

    /// Build an error acknowledgment.
    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorAck {
            error: error.into(),
        })
    }

    /// Render as a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Forwarded chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEnvelope {
    pub sender: UserId,
    pub msg: String,
}

/// Error acknowledgment sent back on the offending session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorAck {
    pub error: String,
}

// ============================================
// Client → Server Messages
// ============================================

/// A chat message as sent by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundChatMessage {
    pub to: RecipientField,
    pub msg: String,
}

/// The `to` field: clients send either a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipientField {
    Id(i64),
    Text(String),
}

impl RecipientField {
    /// Resolve into a user id.
    pub fn user_id(&self) -> Result<UserId, ValidationError> {
        match self {
            RecipientField::Id(raw) => UserId::new(*raw),
            RecipientField::Text(text) => text.parse(),
        }
    }
}

impl InboundChatMessage {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<(UserId, String), ValidationError> {
        let parsed: InboundChatMessage = serde_json::from_str(text)
            .map_err(|e| ValidationError::invalid_format("frame", e.to_string()))?;
        let to = parsed.to.user_id()?;
        Ok((to, parsed.msg))
    }
}
