//! WebSocket upgrade handler for live chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Verify the token and check it belongs to the claimed user
//! 2. Upgrade to WebSocket (refused with 403 otherwise, before any handshake)
//! 3. Register the session and start its writer task
//! 4. Receive frames until disconnect or forced close
//! 5. Deregister, flush the outbound queue, close the socket

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::adapters::http::ApiError;
use crate::domain::chat::SessionError;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::TokenVerifier;

use super::connections::ConnectionTracker;
use super::messages::ServerMessage;
use super::registry::SessionOutbox;
use super::session::{ChatSession, SessionContext};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct ChatSocketState {
    /// Verifies the token presented on connect.
    pub verifier: Arc<dyn TokenVerifier>,
    /// What each session needs once accepted.
    pub sessions: SessionContext,
    /// How long a finished session may spend flushing its outbound queue.
    pub flush_grace: Duration,
    /// Socket tasks still running, drained on shutdown.
    pub connections: ConnectionTracker,
}

/// Router for the live chat endpoint.
pub fn chat_socket_router() -> Router<ChatSocketState> {
    Router::new().route("/chat/ws/:user_id/:token", get(chat_ws_handler))
}

/// Handle WebSocket upgrade requests for live chat.
///
/// Route: `GET /chat/ws/:user_id/:token`
///
/// The token must verify and must belong to `user_id`. Anything else is
/// refused with `403 POLICY_VIOLATION` and the connection is never upgraded.
pub async fn chat_ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path((claimed, token)): Path<(String, String)>,
    State(state): State<ChatSocketState>,
) -> Response {
    let user = match authorize(state.verifier.as_ref(), &claimed, &token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(claimed_user = %claimed, error = %e, "Refusing chat connection");
            return ApiError::policy_violation(e.client_message()).into_response();
        }
    };

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user.id, state))
}

/// Verify `token` and check it names the `claimed` user.
pub async fn authorize(
    verifier: &dyn TokenVerifier,
    claimed: &str,
    token: &str,
) -> Result<AuthenticatedUser, SessionError> {
    let claimed: UserId = claimed.parse().map_err(|_| AuthError::InvalidToken)?;
    let user = verifier.verify(token).await?;

    if user.id != claimed {
        return Err(AuthError::IdentityMismatch {
            claimed,
            verified: user.id,
        }
        .into());
    }
    Ok(user)
}

/// Handle an established WebSocket connection.
///
/// The receive loop runs on this task; outbound messages go through a
/// separate writer task so registry deliveries never wait on the socket.
async fn handle_socket(socket: WebSocket, user: UserId, state: ChatSocketState) {
    let _connection = state.connections.enter();
    let (sink, stream) = socket.split();
    let (session, outbox) = ChatSession::open(user, state.sessions.clone());
    let session_id = session.id();
    let SessionOutbox { messages, closer } = outbox;

    let mut writer = tokio::spawn(write_outbound(sink, messages));
    let mut writer_finished = false;

    tokio::select! {
        _ = session.run(stream, closer) => {}
        _ = &mut writer => {
            writer_finished = true;
            tracing::debug!(
                user_id = %user,
                session_id = %session_id,
                "Writer stopped, ending session"
            );
        }
    }

    // The session is gone from the registry by now, so the writer sees its
    // queue close once pending messages are flushed.
    if !writer_finished && tokio::time::timeout(state.flush_grace, &mut writer).await.is_err() {
        tracing::warn!(
            user_id = %user,
            session_id = %session_id,
            "Writer did not finish in time, aborting"
        );
        writer.abort();
    }
}

/// Drain a session's outbound queue into the socket, then close it.
///
/// Stops early if the socket rejects a write.
pub async fn write_outbound<S>(mut sink: S, mut messages: mpsc::Receiver<ServerMessage>)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(message) = messages.recv().await {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize outbound message: {}", e);
                continue;
            }
        };
        if let Err(e) = sink.send(Message::Text(json)).await {
            tracing::debug!("Send error, closing connection: {}", e);
            return;
        }
    }

    if let Err(e) = sink.send(Message::Close(None)).await {
        tracing::trace!("Close frame not sent: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockTokenVerifier;

    fn uid(raw: i64) -> UserId {
        UserId::new(raw).unwrap()
    }

    fn verifier() -> MockTokenVerifier {
        MockTokenVerifier::new()
            .with_test_user("token-5", 5)
            .with_test_user("token-7", 7)
    }

    #[tokio::test]
    async fn authorize_accepts_matching_identity() {
        let user = authorize(&verifier(), "5", "token-5").await.unwrap();
        assert_eq!(user.id, uid(5));
    }

    #[tokio::test]
    async fn authorize_rejects_token_for_other_user() {
        let err = authorize(&verifier(), "5", "token-7").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::AuthRejected(AuthError::IdentityMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn authorize_rejects_unknown_token() {
        let err = authorize(&verifier(), "5", "bogus").await.unwrap_err();
        assert!(matches!(err, SessionError::AuthRejected(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn authorize_rejects_non_numeric_claim() {
        let err = authorize(&verifier(), "alice", "token-5").await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn writer_sends_queued_messages_then_close() {
        let (sink, sent) = futures::channel::mpsc::unbounded::<Message>();
        let (tx, rx) = mpsc::channel(8);

        tx.send(ServerMessage::chat(uid(1), "one")).await.unwrap();
        tx.send(ServerMessage::error("Invalid message format"))
            .await
            .unwrap();
        drop(tx);

        write_outbound(sink, rx).await;

        let frames: Vec<Message> = sent.collect().await;
        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames[0],
            Message::Text(r#"{"sender":1,"msg":"one"}"#.to_string())
        );
        assert_eq!(
            frames[1],
            Message::Text(r#"{"error":"Invalid message format"}"#.to_string())
        );
        assert!(matches!(frames[2], Message::Close(None)));
    }

    #[tokio::test]
    async fn writer_stops_when_socket_is_gone() {
        let (sink, sent) = futures::channel::mpsc::unbounded::<Message>();
        drop(sent);
        let (tx, rx) = mpsc::channel(8);
        tx.send(ServerMessage::chat(uid(1), "lost")).await.unwrap();

        // Returns even though the sender is still alive.
        tokio::time::timeout(Duration::from_secs(1), write_outbound(sink, rx))
            .await
            .expect("writer should stop on send error");
    }
}
