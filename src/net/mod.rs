//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Upgraded WebSocket connection
//!     → connection.rs (ID assignment, open-count tracking)
//!     → Hand off to the frame loop in http::websocket
//!
//! Connection States:
//!     Open → Closed
//! ```
//!
//! # Design Decisions
//! - Each connection tracked by a drop guard so release is guaranteed
//! - No per-connection state is shared with other connections

pub mod connection;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionState, ConnectionTracker};
