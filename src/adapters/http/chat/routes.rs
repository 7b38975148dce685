//! Axum routes for chat endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{get_history, list_conversations, ChatAppState};

/// Creates routes for chat query endpoints.
///
/// - GET /chat/conversations - Conversation list of the caller
/// - GET /chat/history/:partner_id - Messages with one partner
///
/// Both need the auth middleware in front of them.
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/chat/conversations", get(list_conversations))
        .route("/chat/history/:partner_id", get(get_history))
}
