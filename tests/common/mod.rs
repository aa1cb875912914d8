//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use qa_relay::lifecycle::{self, Shutdown};
use qa_relay::net::ConnectionTracker;
use qa_relay::RelayConfig;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the mock backend saw for one call.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub question: String,
    pub request_id: Option<String>,
}

/// Start a programmable mock backend serving `POST /ask`.
///
/// `f` maps each request to a status code and raw body.
pub async fn start_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(BackendRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    let app = Router::new().route(
        "/ask",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let f = f.clone();
            async move {
                let request = BackendRequest {
                    question: body["question"].as_str().unwrap_or_default().to_string(),
                    request_id: headers
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                };
                let (status, body) = f(request).await;
                (
                    StatusCode::from_u16(status).unwrap(),
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Backend reply body answering `question` with `text` and one reference.
#[allow(dead_code)]
pub fn answer_body(question: &str, text: &str) -> String {
    serde_json::json!({
        "question": question,
        "answer": {
            "text": text,
            "references": [{"title": "Test", "h2": question}]
        }
    })
    .to_string()
}

/// A port nothing is listening on.
#[allow(dead_code)]
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub struct TestRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub connections: ConnectionTracker,
    /// Completes once the relay has stopped and drained its connections.
    #[allow(dead_code)]
    pub server: JoinHandle<std::io::Result<()>>,
}

impl TestRelay {
    pub async fn connect(&self) -> WsClient {
        let (ws, _) = connect_async(format!("ws://{}/ws", self.addr)).await.unwrap();
        ws
    }
}

/// Start a relay on an ephemeral port, forwarding to `backend`.
pub async fn start_relay(backend: SocketAddr, configure: impl FnOnce(&mut RelayConfig)) -> TestRelay {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.url = format!("http://{}/ask", backend);
    configure(&mut config);

    let started = lifecycle::start(config).await.unwrap();
    let connections = started.server.connections();
    let addr = started.local_addr;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = tokio::spawn(started.server.run(started.listener, server_shutdown));

    TestRelay {
        addr,
        shutdown,
        connections,
        server,
    }
}

/// Next non-control frame, failing the test after five seconds.
pub async fn next_frame(ws: &mut WsClient) -> Message {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection ended")
            .expect("read failed");
        match message {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return other,
        }
    }
}

/// Next frame as text, failing on any other frame type.
pub async fn next_text(ws: &mut WsClient) -> String {
    match next_frame(ws).await {
        Message::Text(text) => text.as_str().to_owned(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

/// Send one text question and return the raw reply text.
pub async fn ask(ws: &mut WsClient, question: &str) -> String {
    ws.send(Message::text(question)).await.unwrap();
    next_text(ws).await
}

/// Send one text question and return the reply as JSON.
#[allow(dead_code)]
pub async fn ask_json(ws: &mut WsClient, question: &str) -> Value {
    serde_json::from_str(&ask(ws, question).await).unwrap()
}

/// Poll `check` every 20ms until it holds or `within` elapses.
#[allow(dead_code)]
pub async fn eventually(within: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
