//! Chat query handlers.
//!
//! The write side (persist and forward) lives in the live session loop;
//! these handlers serve the read side.

mod get_history;
mod list_conversations;

pub use get_history::{GetChatHistoryHandler, GetChatHistoryQuery, GetChatHistoryResult};
pub use list_conversations::{
    ListConversationsHandler, ListConversationsQuery, ListConversationsResult,
};
