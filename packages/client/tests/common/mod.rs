//! In-process backend for integration tests: the REST endpoints and the
//! WebSocket endpoint served by axum on an ephemeral port.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::mpsc, task::JoinHandle, time::timeout};

pub const AUTH_TOKEN: &str = "secret";
pub const REJECTED_TOKEN: &str = "tok-rejected";
pub const WAIT: Duration = Duration::from_secs(5);

/// A WebSocket accepted by the backend, handed to the test
pub struct ServerSocket {
    pub thread_id: String,
    pub token: String,
    pub socket: WebSocket,
}

impl ServerSocket {
    pub async fn send_text(&mut self, text: &str) {
        self.socket
            .send(Message::Text(text.into()))
            .await
            .expect("server failed to send frame");
    }

    /// Next text frame from the client, skipping control frames
    pub async fn recv_text(&mut self) -> Option<String> {
        loop {
            match timeout(WAIT, self.socket.recv()).await.ok()?? {
                Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
    }

    /// Next close code from the client
    pub async fn recv_close(&mut self) -> Option<u16> {
        loop {
            match timeout(WAIT, self.socket.recv()).await.ok()?? {
                Ok(Message::Close(frame)) => return frame.map(|f| f.code),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    pub async fn close(mut self, code: u16) {
        let _ = self
            .socket
            .send(Message::Close(Some(CloseFrame {
                code,
                reason: "server closing".into(),
            })))
            .await;
    }
}

#[derive(Clone)]
struct BackendState {
    tokens_issued: Arc<AtomicUsize>,
    sockets: mpsc::UnboundedSender<ServerSocket>,
}

pub struct TestBackend {
    addr: SocketAddr,
    tokens_issued: Arc<AtomicUsize>,
    sockets: mpsc::UnboundedReceiver<ServerSocket>,
    server: JoinHandle<()>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let tokens_issued = Arc::new(AtomicUsize::new(0));
        let (sockets_tx, sockets_rx) = mpsc::unbounded_channel();
        let state = BackendState {
            tokens_issued: tokens_issued.clone(),
            sockets: sockets_tx,
        };

        let app = Router::new()
            .route("/api/threads/{id}/", get(thread_handler))
            .route("/api/threads/{id}/connection-token/", post(token_handler))
            .route("/ws/chat/{id}/", get(websocket_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self {
            addr,
            tokens_issued,
            sockets: sockets_rx,
            server,
        }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws/chat", self.addr)
    }

    pub fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    /// Next socket accepted by the backend
    pub async fn accept(&mut self) -> ServerSocket {
        timeout(WAIT, self.sockets.recv())
            .await
            .expect("timed out waiting for a client connection")
            .expect("backend stopped")
    }

    /// Whether another socket gets accepted within `wait`
    pub async fn accepts_within(&mut self, wait: Duration) -> bool {
        matches!(timeout(wait, self.sockets.recv()).await, Ok(Some(_)))
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", AUTH_TOKEN))
}

async fn thread_handler(Path(id): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "id": id,
        "participants": [
            {"id": 1, "username": "alice"},
            {"id": "2", "username": "bob"}
        ],
        "metadata": {"subject": "lunch"}
    }))
    .into_response()
}

async fn token_handler(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "forbidden" {
        return Json(json!({"token": REJECTED_TOKEN})).into_response();
    }
    let n = state.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"token": format!("tok-{}", n)})).into_response()
}

#[derive(Deserialize)]
struct TokenQuery {
    token: String,
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    if query.token == REJECTED_TOKEN {
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| async move {
        let _ = state.sockets.send(ServerSocket {
            thread_id: id,
            token: query.token,
            socket,
        });
    })
}
