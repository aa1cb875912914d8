//! WebSocket connection handling.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the client
//! - Read data frames one at a time, in arrival order
//! - Relay each question to the backend and write exactly one reply frame
//! - Cancel the in-flight backend call when the client goes away
//!
//! # Data Flow
//! ```text
//! Client ──frame──→ handler ──POST──→ Backend
//! Client ←─frame─── handler ←─JSON─── Backend
//! ```
//!
//! # Design Decisions
//! - Replies use the frame type of the question (text → text, binary → binary)
//! - Relay failures become an error frame; the connection stays open
//! - Read/write/encode failures close only this connection
//! - Frames arriving during a backend call are queued, never interleaved;
//!   the queue is bounded and a full queue pauses reading from the client
//! - Shutdown cancels an in-flight call and sends close code 1001
//! - Ping/pong is answered by the transport and is not an exchange

use std::collections::VecDeque;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::http::server::AppState;
use crate::net::ConnectionId;
use crate::relay::types::InvalidQuestion;
use crate::relay::{AskResponse, ErrorBody, ErrorFrame, ErrorKind, RelayClient, RelayResult};

/// Frame type of a data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}

/// One data frame read from the client.
#[derive(Debug)]
enum Inbound {
    Text(String),
    Binary(Bytes),
}

impl Inbound {
    fn kind(&self) -> FrameKind {
        match self {
            Inbound::Text(_) => FrameKind::Text,
            Inbound::Binary(_) => FrameKind::Binary,
        }
    }

    fn into_question(self) -> Result<String, InvalidQuestion> {
        match self {
            Inbound::Text(text) => Ok(text),
            Inbound::Binary(bytes) => Ok(String::from_utf8(bytes.to_vec())?),
        }
    }
}

/// Upgrade handler for the relay endpoint.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_failed_upgrade(move |error| {
        tracing::warn!(peer_addr = %peer_addr, error = %error, "WebSocket upgrade failed");
    })
    .on_upgrade(move |socket| handle_socket(socket, state, peer_addr))
}

/// Frame loop for one upgraded connection.
async fn handle_socket(socket: WebSocket, state: AppState, peer_addr: SocketAddr) {
    let mut connection = state.connections.track();
    let connection_id = connection.id();
    let mut closing = state.closing.subscribe();
    let (mut sink, mut stream) = socket.split();
    let mut pending: VecDeque<Inbound> = VecDeque::with_capacity(state.max_pending_frames);

    tracing::info!(connection_id = %connection_id, peer_addr = %peer_addr, "Client connected");

    loop {
        // Also covers a shutdown that started before this connection subscribed.
        if *closing.borrow_and_update() {
            send_going_away(&mut sink).await;
            break;
        }

        let inbound = match pending.pop_front() {
            Some(inbound) => inbound,
            None => {
                tokio::select! {
                    next = next_inbound(&mut stream) => match next {
                        Ok(Some(inbound)) => inbound,
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!(connection_id = %connection_id, error = %e, "Read failed");
                            break;
                        }
                    },
                    _ = closing.changed() => continue,
                }
            }
        };

        let kind = inbound.kind();
        let request_id = Uuid::new_v4();

        let encoded = match inbound.into_question() {
            Ok(question) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    request_id = %request_id,
                    bytes = question.len(),
                    "Question received"
                );

                let outcome = ask_watching_peer(
                    &state.relay,
                    &question,
                    request_id,
                    &mut stream,
                    &mut pending,
                    state.max_pending_frames,
                    &mut closing,
                )
                .await;

                match outcome {
                    CallOutcome::Answered(result) => {
                        reply_for(kind, question, result, connection_id, request_id)
                    }
                    CallOutcome::PeerGone => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            request_id = %request_id,
                            "Client went away during backend call, cancelled"
                        );
                        break;
                    }
                    CallOutcome::ShuttingDown => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            request_id = %request_id,
                            "Shutdown during backend call, cancelled"
                        );
                        send_going_away(&mut sink).await;
                        break;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Rejected question");
                let frame = ErrorFrame {
                    question: String::new(),
                    error: ErrorBody {
                        kind: ErrorKind::InvalidQuestion,
                        message: e.to_string(),
                        status: None,
                    },
                };
                encode(kind, &frame)
            }
        };

        let message = match encoded {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode reply");
                break;
            }
        };

        if let Err(e) = sink.send(message).await {
            tracing::warn!(connection_id = %connection_id, error = %e, "Write failed");
            break;
        }
    }

    connection.close();
    let _ = sink.close().await;
    tracing::info!(
        connection_id = %connection_id,
        state = ?connection.state(),
        unanswered = pending.len(),
        "Client disconnected"
    );
}

/// How a backend call watched by [`ask_watching_peer`] ended.
#[derive(Debug)]
enum CallOutcome {
    Answered(RelayResult<AskResponse>),
    /// The client closed or the read failed.
    PeerGone,
    /// The server started shutting down.
    ShuttingDown,
}

/// Run one backend call while watching the client side and the shutdown flag.
///
/// Data frames arriving meanwhile are queued in `pending`, up to `max_pending`.
/// A full queue stops reads until the call completes, so a client that keeps
/// writing is held back by TCP flow control. Except for `Answered`, the call
/// future is dropped, which cancels the backend request.
async fn ask_watching_peer(
    relay: &RelayClient,
    question: &str,
    request_id: Uuid,
    stream: &mut SplitStream<WebSocket>,
    pending: &mut VecDeque<Inbound>,
    max_pending: usize,
    closing: &mut watch::Receiver<bool>,
) -> CallOutcome {
    let call = relay.ask(question, request_id);
    tokio::pin!(call);

    loop {
        tokio::select! {
            result = &mut call => return CallOutcome::Answered(result),
            next = next_inbound(stream), if pending.len() < max_pending => match next {
                Ok(Some(inbound)) => pending.push_back(inbound),
                Ok(None) | Err(_) => return CallOutcome::PeerGone,
            },
            changed = closing.changed() => {
                if changed.is_err() || *closing.borrow_and_update() {
                    return CallOutcome::ShuttingDown;
                }
            }
        }
    }
}

async fn send_going_away(sink: &mut SplitSink<WebSocket, Message>) {
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code: close_code::AWAY,
            reason: Utf8Bytes::from_static("server shutting down"),
        })))
        .await;
}

fn reply_for(
    kind: FrameKind,
    question: String,
    result: RelayResult<AskResponse>,
    connection_id: ConnectionId,
    request_id: Uuid,
) -> Result<Message, serde_json::Error> {
    match result {
        Ok(exchange) => encode(kind, &exchange),
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                request_id = %request_id,
                error = %e,
                "Relay failed"
            );
            let frame = ErrorFrame {
                question,
                error: e.to_error_body(),
            };
            encode(kind, &frame)
        }
    }
}

/// Next data frame; `Ok(None)` once the peer has closed.
async fn next_inbound(stream: &mut SplitStream<WebSocket>) -> Result<Option<Inbound>, axum::Error> {
    while let Some(message) = stream.next().await {
        match message? {
            Message::Text(text) => return Ok(Some(Inbound::Text(text.as_str().to_owned()))),
            Message::Binary(bytes) => return Ok(Some(Inbound::Binary(bytes))),
            Message::Close(_) => return Ok(None),
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    Ok(None)
}

fn encode<T: Serialize>(kind: FrameKind, value: &T) -> Result<Message, serde_json::Error> {
    Ok(match kind {
        FrameKind::Text => Message::Text(serde_json::to_string(value)?.into()),
        FrameKind::Binary => Message::Binary(serde_json::to_vec(value)?.into()),
    })
}
