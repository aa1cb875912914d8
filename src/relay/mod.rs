//! Question relay subsystem.
//!
//! # Data Flow
//! ```text
//! question (from WebSocket frame)
//!     → client.rs (POST {"question": ...} to backend, with deadline)
//!     → types.rs (decode AskResponse: text + references)
//!     → error.rs (classify failures into RelayError)
//!     → back to the connection handler for encoding
//! ```
//!
//! # Design Decisions
//! - One backend call per question, no retry
//! - Every failure is a typed value scoped to one exchange
//! - Backend endpoint fixed at startup from configuration

pub mod client;
pub mod error;
pub mod types;

pub use client::{RelayClient, X_REQUEST_ID};
pub use error::{ClientBuildError, RelayError, RelayResult};
pub use types::{Answer, AskRequest, AskResponse, ErrorBody, ErrorFrame, ErrorKind, Reference};
