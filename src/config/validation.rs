//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject paths that collide with built-in routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::http::HEALTH_PATH;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.ws_path '{0}' must start with '/' and must not be the health route")]
    WsPath(String),

    #[error("backend.url '{url}' is invalid: {reason}")]
    BackendUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.log_level '{0}' is not a level (trace, debug, info, warn, error, off)")]
    LogLevel(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let ws_path = &config.listener.ws_path;
    if !ws_path.starts_with('/') || ws_path == HEALTH_PATH {
        errors.push(ValidationError::WsPath(ws_path.clone()));
    }

    match Url::parse(&config.backend.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::BackendUrl {
            url: config.backend.url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::BackendUrl {
            url: config.backend.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.backend.timeout_secs == 0 {
        errors.push(ValidationError::Zero("backend.timeout_secs"));
    }
    if config.backend.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("backend.connect_timeout_secs"));
    }
    if config.listener.max_pending_frames == 0 {
        errors.push(ValidationError::Zero("listener.max_pending_frames"));
    }
    if config.listener.drain_timeout_secs == 0 {
        errors.push(ValidationError::Zero("listener.drain_timeout_secs"));
    }

    // Only a level: it is expanded into per-target directives at startup.
    if config.observability.log_level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
