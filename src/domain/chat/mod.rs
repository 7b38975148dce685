//! Chat domain - direct messages between users and the views derived from them.

mod conversation;
mod errors;
mod message;

pub use conversation::{sort_by_recency, ConversationPartner, ConversationSummary};
pub use errors::SessionError;
pub use message::ChatMessage;
