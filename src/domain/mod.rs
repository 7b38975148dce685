//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `chat` - Chat messages, conversation summaries, session errors

pub mod chat;
pub mod foundation;
