//! Top-level router: every endpoint with its state and the shared layers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{chat_socket_router, ChatSocketState, SessionRegistry};

use super::chat::{chat_routes, handlers::health, ChatAppState};
use super::middleware::{auth_middleware, AuthState};

/// Everything the router needs.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatAppState,
    pub socket: ChatSocketState,
    pub verifier: AuthState,
    pub registry: Arc<SessionRegistry>,
}

/// Build the application router.
///
/// `cors_origins` empty means any origin is allowed. The timeout bounds
/// plain HTTP requests; upgraded connections are not affected.
pub fn build_router(state: AppState, cors_origins: &[String], request_timeout: Duration) -> Router {
    let queries = chat_routes()
        .with_state(state.chat)
        .layer(middleware::from_fn_with_state(state.verifier, auth_middleware));

    let probes = Router::new()
        .route("/health", get(health))
        .with_state(state.registry);

    Router::new()
        .merge(queries)
        .merge(chat_socket_router().with_state(state.socket))
        .merge(probes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}
