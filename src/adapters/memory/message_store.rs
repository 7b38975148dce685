//! In-memory message store.
//!
//! Implements both `MessageRepository` and `MessageReader` over a vector of
//! messages. Backs the unit and integration tests; the server binary always
//! uses Postgres.
//!
//! Failure injection (`fail_saves`) lets tests exercise the
//! persistence-failure path of a live session.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::chat::{ChatMessage, ConversationPartner};
use crate::domain::foundation::UserId;
use crate::ports::{MessageReader, MessageRepository, MessageStoreError};

/// Message store kept entirely in process memory.
///
/// # Panics
///
/// Methods panic if an internal lock is poisoned.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<ChatMessage>>,
    usernames: RwLock<HashMap<UserId, String>>,
    fail_saves: AtomicBool,
    save_attempts: AtomicUsize,
}

impl InMemoryMessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a display name for a user (the users table, in miniature).
    pub fn with_username(self, user: UserId, name: impl Into<String>) -> Self {
        self.usernames
            .write()
            .expect("InMemoryMessageStore: usernames lock poisoned")
            .insert(user, name.into());
        self
    }

    /// Makes every subsequent `save` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Inserts a message directly, bypassing failure injection.
    pub fn seed(&self, message: ChatMessage) {
        self.messages
            .write()
            .expect("InMemoryMessageStore: messages lock poisoned")
            .push(message);
    }

    /// Returns every stored message in insertion order.
    pub fn stored(&self) -> Vec<ChatMessage> {
        self.messages
            .read()
            .expect("InMemoryMessageStore: messages lock poisoned")
            .clone()
    }

    /// Number of `save` calls, successful or not.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    fn display_name(&self, user: UserId) -> String {
        self.usernames
            .read()
            .expect("InMemoryMessageStore: usernames lock poisoned")
            .get(&user)
            .cloned()
            .unwrap_or_else(|| format!("user-{}", user))
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageStore {
    async fn save(&self, message: &ChatMessage) -> Result<(), MessageStoreError> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(MessageStoreError::Database(
                "simulated storage outage".to_string(),
            ));
        }
        self.seed(message.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageReader for InMemoryMessageStore {
    async fn history(&self, a: UserId, b: UserId) -> Result<Vec<ChatMessage>, MessageStoreError> {
        let mut history: Vec<ChatMessage> = self
            .stored()
            .into_iter()
            .filter(|m| m.is_between(a, b))
            .collect();
        // Stable sort keeps insertion order for identical timestamps
        history.sort_by_key(|m| m.timestamp());
        Ok(history)
    }

    async fn conversation_partners(
        &self,
        user: UserId,
    ) -> Result<Vec<ConversationPartner>, MessageStoreError> {
        let partner_ids: BTreeSet<UserId> = self
            .stored()
            .iter()
            .filter_map(|m| m.partner_of(user))
            .collect();

        Ok(partner_ids
            .into_iter()
            .map(|id| ConversationPartner {
                id,
                display_name: self.display_name(id),
            })
            .collect())
    }

    async fn latest_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<ChatMessage>, MessageStoreError> {
        // max_by_key returns the last maximum, so later inserts win ties
        Ok(self
            .stored()
            .into_iter()
            .filter(|m| m.is_between(a, b))
            .max_by_key(|m| m.timestamp()))
    }
}
