//! HTTP handlers for chat endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, State};

use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::ApiError;
use crate::adapters::websocket::SessionRegistry;
use crate::application::handlers::chat::{
    GetChatHistoryHandler, GetChatHistoryQuery, ListConversationsHandler, ListConversationsQuery,
};
use crate::domain::foundation::UserId;
use crate::ports::MessageReader;

use super::dto::{ChatMessageResponse, ConversationSummaryResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Application state for chat HTTP handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub reader: Arc<dyn MessageReader>,
    pub registry: Arc<SessionRegistry>,
}

impl ChatAppState {
    pub fn new(reader: Arc<dyn MessageReader>, registry: Arc<SessionRegistry>) -> Self {
        Self { reader, registry }
    }

    fn list_conversations_handler(&self) -> ListConversationsHandler {
        ListConversationsHandler::new(self.reader.clone(), self.registry.clone())
    }

    fn history_handler(&self) -> GetChatHistoryHandler {
        GetChatHistoryHandler::new(self.reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /chat/conversations - Conversation list of the caller, most recent first
pub async fn list_conversations(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ConversationSummaryResponse>>, ApiError> {
    let summaries = state
        .list_conversations_handler()
        .handle(ListConversationsQuery { user_id: user.id })
        .await?;

    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// GET /chat/history/:partner_id - Messages between the caller and a partner, oldest first
pub async fn get_history(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(partner_id): Path<String>,
) -> Result<Json<Vec<ChatMessageResponse>>, ApiError> {
    let partner_id: UserId = partner_id.parse()?;

    let messages = state
        .history_handler()
        .handle(GetChatHistoryQuery {
            user_id: user.id,
            partner_id,
        })
        .await?;

    Ok(Json(messages.iter().map(Into::into).collect()))
}

/// GET /health - Liveness probe with registry counters
pub async fn health(State(registry): State<Arc<SessionRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        online_users: registry.online_users().len(),
        sessions: registry.total_sessions(),
    })
}
