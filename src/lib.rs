//! WebSocket front door for a question-answering backend.
//!
//! Each text or binary frame a client sends is one question. The relay POSTs
//! it to the backend's ask endpoint and writes the structured answer (text
//! plus references) back as one frame on the same connection.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
