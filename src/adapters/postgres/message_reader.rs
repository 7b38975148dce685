//! PostgreSQL implementation of MessageReader.
//!
//! Partner display names come from the account service's `users` table,
//! which lives in the same database.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::chat::{ChatMessage, ConversationPartner};
use crate::domain::foundation::{MessageId, Timestamp, UserId};
use crate::ports::{MessageReader, MessageStoreError};

// `seq` follows insertion order, so messages sharing a `sent_at` keep the
// order they were saved in.
const HISTORY_SQL: &str = r#"
    SELECT id, sender_id, receiver_id, content, sent_at
    FROM messages
    WHERE (sender_id = $1 AND receiver_id = $2)
       OR (sender_id = $2 AND receiver_id = $1)
    ORDER BY sent_at ASC, seq ASC
"#;

const LATEST_BETWEEN_SQL: &str = r#"
    SELECT id, sender_id, receiver_id, content, sent_at
    FROM messages
    WHERE (sender_id = $1 AND receiver_id = $2)
       OR (sender_id = $2 AND receiver_id = $1)
    ORDER BY sent_at DESC, seq DESC
    LIMIT 1
"#;

/// PostgreSQL implementation of MessageReader.
#[derive(Clone)]
pub struct PostgresMessageReader {
    pool: PgPool,
}

impl PostgresMessageReader {
    /// Creates a new PostgresMessageReader.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageReader for PostgresMessageReader {
    async fn history(&self, a: UserId, b: UserId) -> Result<Vec<ChatMessage>, MessageStoreError> {
        let rows = sqlx::query(HISTORY_SQL)
        .bind(a.as_i64())
        .bind(b.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageStoreError::Database(format!("Failed to fetch history: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn conversation_partners(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationPartner>, MessageStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT p.partner_id, u.username
            FROM (
                SELECT receiver_id AS partner_id FROM messages WHERE sender_id = $1
                UNION
                SELECT sender_id AS partner_id FROM messages WHERE receiver_id = $1
            ) p
            LEFT JOIN users u ON u.id = p.partner_id
            ORDER BY p.partner_id ASC
            "#,
        )
        .bind(user.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageStoreError::Database(format!("Failed to fetch partners: {}", e)))?;

        rows.iter()
            .map(|row| {
                let raw_id: i64 = row.get("partner_id");
                let username: Option<String> = row.get("username");
                let id = to_user_id(raw_id)?;
                Ok(ConversationPartner {
                    id,
                    display_name: username.unwrap_or_else(|| format!("user-{}", id)),
                })
            })
            .collect()
    }

    async fn latest_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<ChatMessage>, MessageStoreError> {
        let row = sqlx::query(LATEST_BETWEEN_SQL)
        .bind(a.as_i64())
        .bind(b.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            MessageStoreError::Database(format!("Failed to fetch latest message: {}", e))
        })?;

        row.as_ref().map(row_to_message).transpose()
    }
}

fn row_to_message(row: &PgRow) -> Result<ChatMessage, MessageStoreError> {
    let id: uuid::Uuid = row.get("id");
    let sender_id: i64 = row.get("sender_id");
    let receiver_id: i64 = row.get("receiver_id");
    let content: String = row.get("content");
    let sent_at: chrono::DateTime<chrono::Utc> = row.get("sent_at");

    Ok(ChatMessage::reconstitute(
        MessageId::from_uuid(id),
        to_user_id(sender_id)?,
        to_user_id(receiver_id)?,
        content,
        Timestamp::from_datetime(sent_at),
    ))
}

fn to_user_id(raw: i64) -> Result<UserId, MessageStoreError> {
    UserId::new(raw).map_err(|e| MessageStoreError::CorruptRow(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_message_breaks_timestamp_ties_by_insertion_order() {
        assert!(LATEST_BETWEEN_SQL.contains("ORDER BY sent_at DESC, seq DESC"));
        assert!(LATEST_BETWEEN_SQL.contains("LIMIT 1"));
    }

    #[test]
    fn history_breaks_timestamp_ties_by_insertion_order() {
        assert!(HISTORY_SQL.contains("ORDER BY sent_at ASC, seq ASC"));
    }

    #[test]
    fn non_positive_user_id_is_a_corrupt_row() {
        assert!(matches!(to_user_id(0), Err(MessageStoreError::CorruptRow(_))));
        assert!(to_user_id(7).is_ok());
    }
}
