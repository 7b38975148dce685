//! Application handlers.
//!
//! Query handlers that orchestrate ports for the HTTP surface.

pub mod chat;

pub use chat::{
    GetChatHistoryHandler, GetChatHistoryQuery, GetChatHistoryResult, ListConversationsHandler,
    ListConversationsQuery, ListConversationsResult,
};
