//! HTTP adapter for chat endpoints.
//!
//! - `GET /chat/conversations` - conversation list of the caller
//! - `GET /chat/history/:partner_id` - messages with one partner
//! - `GET /health` - liveness and registry counters
//!
//! The live connection endpoint lives in `adapters::websocket`.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ChatAppState;
pub use routes::chat_routes;
