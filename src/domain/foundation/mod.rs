//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the chat domain.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{ErrorCode, ValidationError};
pub use ids::{MessageId, SessionId, UserId};
pub use timestamp::Timestamp;
