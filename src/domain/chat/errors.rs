//! Errors a live chat session can run into.

use thiserror::Error;

use crate::domain::foundation::AuthError;

/// What went wrong inside one session.
///
/// Only `AuthRejected` and `ChannelFailure` end a session; the other two are
/// acknowledged to the sender and the session keeps streaming.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The connection could not be authenticated; it is never accepted.
    #[error("Authentication rejected: {0}")]
    AuthRejected(#[from] AuthError),

    /// An inbound frame could not be turned into a chat message.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// The message could not be stored, so it was not forwarded.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The underlying transport failed or closed.
    #[error("Channel failure: {0}")]
    ChannelFailure(String),
}

impl SessionError {
    /// Returns true if the session must end after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::AuthRejected(_) | SessionError::ChannelFailure(_)
        )
    }

    /// Text sent back to the client in an `{"error": ...}` acknowledgment.
    pub fn client_message(&self) -> &'static str {
        match self {
            SessionError::AuthRejected(_) => "Authentication failed",
            SessionError::MalformedFrame(_) => "Invalid message format",
            SessionError::PersistenceFailure(_) => "Message could not be saved",
            SessionError::ChannelFailure(_) => "Connection error",
        }
    }
}
