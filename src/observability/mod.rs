//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with connection_id / request_id fields
//!     → logging.rs (EnvFilter + fmt subscriber)
//!     → stdout
//! ```

pub mod logging;

pub use logging::init_logging;
