//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Token verification (JWT, test double)
//! - `http` - REST endpoints, auth middleware, router
//! - `memory` - In-memory message store
//! - `postgres` - PostgreSQL message storage
//! - `websocket` - Live sessions, session registry, upgrade handler

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
