//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `TokenVerifier` - identity of a presented access token
//! - `MessageRepository` - durable storage of chat messages
//! - `MessageReader` - history and conversation-partner queries
//! - `PresenceChecker` - live presence, answered by the session registry

mod message_reader;
mod message_repository;
mod presence;
mod token_verifier;

pub use message_reader::MessageReader;
pub use message_repository::{MessageRepository, MessageStoreError};
pub use presence::PresenceChecker;
pub use token_verifier::TokenVerifier;
