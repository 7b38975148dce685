//! One live chat session: the receive loop behind a WebSocket connection.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──verify──▶ Authenticated ──register──▶ Streaming ──▶ Closed
//! ```
//!
//! Verification happens in the upgrade handler, before the socket exists.
//! [`ChatSession::open`] registers the session, [`ChatSession::run`] streams
//! until the peer leaves or the registry closes the session, and dropping
//! the session deregisters it on every exit path, unwinding included.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, Notify};

use crate::domain::chat::{ChatMessage, SessionError};
use crate::domain::foundation::{SessionId, UserId};
use crate::ports::MessageRepository;

use super::messages::{InboundChatMessage, ServerMessage};
use super::registry::{SessionOutbox, SessionRegistry};

/// Shared dependencies every session needs.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<SessionRegistry>,
    pub repository: Arc<dyn MessageRepository>,
    pub max_message_length: usize,
}

/// Why a session's receive loop stopped.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer sent a close frame or the stream ended.
    PeerClosed,
    /// The registry asked the session to close (eviction or shutdown).
    ForcedClose,
    /// The transport failed.
    Failed(SessionError),
}

/// Deregisters a session when dropped.
struct RegistrationGuard {
    registry: Arc<SessionRegistry>,
    user: UserId,
    session_id: SessionId,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        self.registry.deregister(&self.user, &self.session_id);
    }
}

/// A registered, streaming session of one authenticated user.
pub struct ChatSession {
    user: UserId,
    session_id: SessionId,
    // Own handle on the outbound queue, for acknowledgments.
    outbox: mpsc::Sender<ServerMessage>,
    context: SessionContext,
    _registration: RegistrationGuard,
}

impl ChatSession {
    /// Register a new session for `user`.
    ///
    /// Returns the session and the outbound half its writer must drain.
    pub fn open(user: UserId, context: SessionContext) -> (Self, SessionOutbox) {
        let (handle, outbox) = context.registry.open_session();
        let session_id = handle.id();
        let sender = handle.sender();
        context.registry.register(user, handle);

        let session = Self {
            user,
            session_id,
            outbox: sender,
            _registration: RegistrationGuard {
                registry: context.registry.clone(),
                user,
                session_id,
            },
            context,
        };
        (session, outbox)
    }

    /// The session's id.
    pub fn id(&self) -> SessionId {
        self.session_id
    }

    /// The authenticated user behind this session.
    pub fn user(&self) -> UserId {
        self.user
    }

    /// Stream inbound frames until the peer leaves, the transport fails, or
    /// `closer` fires.
    ///
    /// Consumes the session; it is deregistered when this returns.
    pub async fn run<S>(self, mut inbound: S, closer: Arc<Notify>) -> SessionEnd
    where
        S: Stream<Item = Result<Message, axum::Error>> + Unpin,
    {
        tracing::info!(
            user_id = %self.user,
            session_id = %self.session_id,
            "Chat session streaming"
        );

        let end = loop {
            tokio::select! {
                _ = closer.notified() => break SessionEnd::ForcedClose,
                frame = inbound.next() => match frame {
                    None | Some(Ok(Message::Close(_))) => break SessionEnd::PeerClosed,
                    Some(Err(e)) => {
                        break SessionEnd::Failed(SessionError::ChannelFailure(e.to_string()))
                    }
                    Some(Ok(frame)) => self.handle_frame(frame).await,
                },
            }
        };

        tracing::info!(
            user_id = %self.user,
            session_id = %self.session_id,
            reason = ?end,
            "Chat session ended"
        );
        end
    }

    async fn handle_frame(&self, frame: Message) {
        let result = match frame {
            Message::Text(text) => self.relay(&text).await.map(|_| ()),
            Message::Binary(_) => Err(SessionError::MalformedFrame(
                "binary frames are not supported".to_string(),
            )),
            // Protocol keepalives; axum answers pings itself.
            Message::Ping(_) | Message::Pong(_) => Ok(()),
            Message::Close(_) => Ok(()),
        };

        if let Err(e) = result {
            self.acknowledge(&e);
        }
    }

    /// Parse, persist and forward one text frame.
    ///
    /// Returns the number of the recipient's sessions the message reached.
    /// Nothing is forwarded unless the message was stored.
    async fn relay(&self, text: &str) -> Result<usize, SessionError> {
        let (to, content) = InboundChatMessage::parse(text)
            .map_err(|e| SessionError::MalformedFrame(e.to_string()))?;

        let message = ChatMessage::with_limit(
            self.user,
            to,
            content,
            self.context.max_message_length,
        )
        .map_err(|e| SessionError::MalformedFrame(e.to_string()))?;

        if let Err(e) = self.context.repository.save(&message).await {
            tracing::error!(
                user_id = %self.user,
                receiver_id = %to,
                message_id = %message.id(),
                error = %e,
                "Failed to persist chat message"
            );
            return Err(SessionError::PersistenceFailure(e.to_string()));
        }

        let delivered = self
            .context
            .registry
            .send_to_user(&to, &ServerMessage::chat(self.user, message.content()));

        tracing::debug!(
            user_id = %self.user,
            receiver_id = %to,
            message_id = %message.id(),
            delivered,
            "Chat message relayed"
        );
        Ok(delivered)
    }

    fn acknowledge(&self, error: &SessionError) {
        tracing::debug!(
            user_id = %self.user,
            session_id = %self.session_id,
            error = %error,
            "Rejected inbound frame"
        );
        if self
            .outbox
            .try_send(ServerMessage::error(error.client_message()))
            .is_err()
        {
            tracing::debug!(
                session_id = %self.session_id,
                "Could not queue error acknowledgment"
            );
        }
    }
}
