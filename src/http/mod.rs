//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → websocket.rs (upgrade on /ws, frame loop)
//!     → relay client (backend call)
//!     → websocket.rs (one reply frame per question)
//!
//! GET /health → health.rs
//! ```

pub mod health;
pub mod server;
pub mod websocket;

pub use health::HEALTH_PATH;
pub use server::{AppState, RelayServer};
