//! WebSocket adapters for live direct chat.
//!
//! # Architecture
//!
//! ```text
//!  client A ──frames──▶ ChatSession (A) ──save──▶ MessageRepository
//!                              │
//!                              │ send_to_user(B)
//!                              ▼
//!                       SessionRegistry
//!                       user B ├── session 1 outbox ──▶ writer ──▶ client B (phone)
//!                              └── session 2 outbox ──▶ writer ──▶ client B (laptop)
//! ```
//!
//! # Components
//!
//! - [`messages`] - wire format of inbound and outbound frames
//! - [`registry`] - sharded map of live sessions per user, presence
//! - [`session`] - per-connection receive loop
//! - [`handler`] - axum upgrade handler and outbound writer
//! - [`connections`] - count of socket tasks still flushing, for shutdown

pub mod connections;
pub mod handler;
pub mod messages;
pub mod registry;
pub mod session;

pub use connections::{ConnectionGuard, ConnectionTracker};
pub use handler::{chat_socket_router, chat_ws_handler, ChatSocketState};
pub use messages::{InboundChatMessage, ServerMessage};
pub use registry::{SessionHandle, SessionOutbox, SessionRegistry};
pub use session::{ChatSession, SessionContext, SessionEnd};
