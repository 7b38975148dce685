//! ChatMessage - an immutable direct message between two users.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, UserId, ValidationError};

/// One direct message from `sender` to `receiver`.
///
/// Created once by the session that received it, persisted exactly once,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: MessageId,
    sender: UserId,
    receiver: UserId,
    content: String,
    timestamp: Timestamp,
}

impl ChatMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(sender: UserId, receiver: UserId, content: impl Into<String>) -> Self {
        Self::reconstitute(
            MessageId::new(),
            sender,
            receiver,
            content,
            Timestamp::now(),
        )
    }

    /// Creates a message and checks its content against a length limit.
    ///
    /// Length is measured in characters, not bytes.
    pub fn with_limit(
        sender: UserId,
        receiver: UserId,
        content: impl Into<String>,
        max_chars: usize,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        let len = content.chars().count();
        if len > max_chars {
            return Err(ValidationError::out_of_range_i64(
                "msg",
                0,
                max_chars as i64,
                len as i64,
            ));
        }
        Ok(Self::new(sender, receiver, content))
    }

    /// Rebuilds a message from stored fields.
    pub fn reconstitute(
        id: MessageId,
        sender: UserId,
        receiver: UserId,
        content: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            sender,
            receiver,
            content: content.into(),
            timestamp,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> UserId {
        self.sender
    }

    pub fn receiver(&self) -> UserId {
        self.receiver
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns true if this message was exchanged between `a` and `b`,
    /// in either direction.
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }

    /// Returns the other participant from `user`'s point of view, or `None`
    /// if `user` took no part in this message.
    pub fn partner_of(&self, user: UserId) -> Option<UserId> {
        if self.sender == user {
            Some(self.receiver)
        } else if self.receiver == user {
            Some(self.sender)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(raw: i64) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn new_message_carries_participants_and_content() {
        let msg = ChatMessage::new(uid(1), uid(2), "hi");

        assert_eq!(msg.sender(), uid(1));
        assert_eq!(msg.receiver(), uid(2));
        assert_eq!(msg.content(), "hi");
    }

    #[test]
    fn with_limit_rejects_oversized_content() {
        let result = ChatMessage::with_limit(uid(1), uid(2), "abcdef", 5);
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn with_limit_counts_characters_not_bytes() {
        let result = ChatMessage::with_limit(uid(1), uid(2), "héllo", 5);
        assert!(result.is_ok());
    }

    #[test]
    fn is_between_matches_both_directions() {
        let msg = ChatMessage::new(uid(1), uid(2), "hi");

        assert!(msg.is_between(uid(1), uid(2)));
        assert!(msg.is_between(uid(2), uid(1)));
        assert!(!msg.is_between(uid(1), uid(3)));
    }

    #[test]
    fn partner_of_returns_other_side() {
        let msg = ChatMessage::new(uid(1), uid(2), "hi");

        assert_eq!(msg.partner_of(uid(1)), Some(uid(2)));
        assert_eq!(msg.partner_of(uid(2)), Some(uid(1)));
        assert_eq!(msg.partner_of(uid(3)), None);
    }
}
