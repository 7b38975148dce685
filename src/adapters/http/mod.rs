//! HTTP adapters - REST API implementations.

pub mod chat;
pub mod error;
pub mod middleware;
pub mod router;

pub use chat::{chat_routes, ChatAppState};
pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, AppState};
