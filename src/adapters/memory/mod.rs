//! In-memory adapters for unit and integration tests.

mod message_store;

pub use message_store::InMemoryMessageStore;
