//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::chat::ChatMessage;
use crate::ports::{MessageRepository, MessageStoreError};

/// PostgreSQL implementation of MessageRepository.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    /// Creates a new PostgresMessageRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn save(&self, message: &ChatMessage) -> Result<(), MessageStoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, content, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.sender().as_i64())
        .bind(message.receiver().as_i64())
        .bind(message.content())
        .bind(message.timestamp().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| MessageStoreError::Database(format!("Failed to insert message: {}", e)))?;

        Ok(())
    }
}
