//! Roommate Chat server entrypoint.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use roommate_chat::adapters::auth::JwtTokenVerifier;
use roommate_chat::adapters::http::{build_router, AppState, ChatAppState};
use roommate_chat::adapters::postgres::{
    run_migrations, PostgresMessageReader, PostgresMessageRepository,
};
use roommate_chat::adapters::websocket::{
    ChatSocketState, ConnectionTracker, SessionContext, SessionRegistry,
};
use roommate_chat::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    info!(
        environment = ?config.server.environment,
        host = %config.server.host,
        port = config.server.port,
        "Starting roommate-chat"
    );

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
        info!("Database migrations applied");
    }

    let verifier = Arc::new(JwtTokenVerifier::from_config(&config.auth)?);
    let registry = Arc::new(SessionRegistry::new(
        config.chat.registry_shards,
        config.chat.outbound_buffer,
    ));
    let repository = Arc::new(PostgresMessageRepository::new(pool.clone()));
    let reader = Arc::new(PostgresMessageReader::new(pool));
    let connections = ConnectionTracker::new();

    let state = AppState {
        chat: ChatAppState::new(reader, registry.clone()),
        socket: ChatSocketState {
            verifier: verifier.clone(),
            sessions: SessionContext {
                registry: registry.clone(),
                repository,
                max_message_length: config.chat.max_message_length,
            },
            flush_grace: config.chat.shutdown_grace(),
            connections: connections.clone(),
        },
        verifier,
        registry: registry.clone(),
    };

    let app = build_router(
        state,
        &config.server.cors_origins_list(),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Upgraded connections outlive the listener; tell them to close and wait
    // for their writers to flush, up to the grace period.
    let closed = registry.close_all();
    info!(sessions = closed, "Closing live sessions");
    if !connections.wait_idle(config.chat.shutdown_grace()).await {
        warn!(
            remaining = connections.active(),
            "Connections still open after shutdown grace"
        );
    }
    info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
