//! End-to-end tests over real WebSocket connections.
//!
//! Serves the full router on an ephemeral port and connects with a
//! `tokio-tungstenite` client, so the upgrade, the writer task and close
//! handling all run as they do in production.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use roommate_chat::adapters::auth::MockTokenVerifier;
use roommate_chat::adapters::http::{build_router, AppState, ChatAppState};
use roommate_chat::adapters::memory::InMemoryMessageStore;
use roommate_chat::adapters::websocket::{
    ChatSocketState, ConnectionTracker, SessionContext, SessionRegistry,
};
use roommate_chat::domain::foundation::UserId;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    registry: Arc<SessionRegistry>,
    store: Arc<InMemoryMessageStore>,
    connections: ConnectionTracker,
}

/// Boot the service on 127.0.0.1 with an OS-assigned port.
async fn boot_server() -> TestServer {
    let store = Arc::new(InMemoryMessageStore::new());
    let registry = Arc::new(SessionRegistry::with_defaults());
    let connections = ConnectionTracker::new();
    let verifier = Arc::new(
        MockTokenVerifier::new()
            .with_test_user("token-1", 1)
            .with_test_user("token-2", 2),
    );

    let state = AppState {
        chat: ChatAppState::new(store.clone(), registry.clone()),
        socket: ChatSocketState {
            verifier: verifier.clone(),
            sessions: SessionContext {
                registry: registry.clone(),
                repository: store.clone(),
                max_message_length: 4000,
            },
            flush_grace: Duration::from_secs(1),
            connections: connections.clone(),
        },
        verifier,
        registry: registry.clone(),
    };
    let app = build_router(state, &[], Duration::from_secs(5));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        registry,
        store,
        connections,
    }
}

impl TestServer {
    fn url(&self, user_id: &str, token: &str) -> String {
        format!("ws://{}/chat/ws/{}/{}", self.addr, user_id, token)
    }

    async fn connect(&self, user_id: &str, token: &str) -> WsStream {
        let (ws, _response) = timeout(TIMEOUT, connect_async(self.url(user_id, token)))
            .await
            .expect("connect timed out")
            .expect("handshake failed");
        ws
    }

    /// Registration finishes on the server after the handshake response,
    /// so wait for the registry to catch up.
    async fn wait_for(&self, what: &str, condition: impl Fn(&SessionRegistry) -> bool) {
        let deadline = tokio::time::Instant::now() + TIMEOUT;
        while !condition(self.registry.as_ref()) {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {}",
                what
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

fn uid(raw: i64) -> UserId {
    UserId::new(raw).unwrap()
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

/// Next text frame as JSON, skipping control frames.
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection ended")
            .expect("transport error");
        match msg {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}

// =============================================================================
// Relay
// =============================================================================

#[tokio::test]
async fn hi_from_one_user_reaches_the_other() {
    let server = boot_server().await;
    let mut alice = server.connect("1", "token-1").await;
    let mut bob = server.connect("2", "token-2").await;
    server
        .wait_for("both sessions", |r| r.total_sessions() == 2)
        .await;

    send_json(&mut alice, json!({"to": 2, "msg": "hi"})).await;

    assert_eq!(read_json(&mut bob).await, json!({"sender": 1, "msg": "hi"}));
    let stored = server.store.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sender(), uid(1));
    assert_eq!(stored[0].receiver(), uid(2));
}

#[tokio::test]
async fn malformed_frame_is_acknowledged_and_connection_stays_open() {
    let server = boot_server().await;
    let mut alice = server.connect("1", "token-1").await;
    let mut bob = server.connect("2", "token-2").await;
    server
        .wait_for("both sessions", |r| r.total_sessions() == 2)
        .await;

    alice
        .send(Message::Text("not json".to_string()))
        .await
        .unwrap();
    assert_eq!(
        read_json(&mut alice).await,
        json!({"error": "Invalid message format"})
    );
    assert!(server.store.stored().is_empty());

    send_json(&mut alice, json!({"to": 2, "msg": "still here"})).await;
    assert_eq!(
        read_json(&mut bob).await,
        json!({"sender": 1, "msg": "still here"})
    );
}

// =============================================================================
// Connection lifecycle
// =============================================================================

#[tokio::test]
async fn client_close_takes_user_offline() {
    let server = boot_server().await;
    let mut alice = server.connect("1", "token-1").await;
    let _bob = server.connect("2", "token-2").await;
    server
        .wait_for("both sessions", |r| r.total_sessions() == 2)
        .await;

    alice.close(None).await.unwrap();

    server
        .wait_for("user 1 offline", |r| !r.is_online(&uid(1)))
        .await;
    assert!(server.registry.is_online(&uid(2)));
}

#[tokio::test]
async fn dropped_tcp_connection_is_deregistered() {
    let server = boot_server().await;
    let alice = server.connect("1", "token-1").await;
    server
        .wait_for("session registered", |r| r.is_online(&uid(1)))
        .await;

    drop(alice);

    server
        .wait_for("session removed", |r| r.total_sessions() == 0)
        .await;
}

#[tokio::test]
async fn mismatched_identity_fails_the_handshake() {
    let server = boot_server().await;

    let result = timeout(TIMEOUT, connect_async(server.url("5", "token-2")))
        .await
        .expect("connect timed out");

    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 403);
        }
        other => panic!("expected HTTP 403, got {:?}", other.map(|_| ())),
    }
    assert_eq!(server.registry.total_sessions(), 0);
}

#[tokio::test]
async fn forced_close_sends_close_frame_to_client() {
    let server = boot_server().await;
    let mut alice = server.connect("1", "token-1").await;
    server
        .wait_for("session registered", |r| r.is_online(&uid(1)))
        .await;
    assert_eq!(server.connections.active(), 1);

    assert_eq!(server.registry.close_all(), 1);

    let frame = timeout(TIMEOUT, alice.next())
        .await
        .expect("timed out waiting for close");
    assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
    assert_eq!(server.registry.total_sessions(), 0);

    // The socket task finishes its flush well inside the grace period.
    assert!(server.connections.wait_idle(TIMEOUT).await);
    assert_eq!(server.connections.active(), 0);
}
