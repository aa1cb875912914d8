//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, WebSocket path).
    pub listener: ListenerConfig,

    /// Question-answering backend the relay forwards to.
    pub backend: BackendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path the WebSocket upgrade is served on.
    pub ws_path: String,

    /// Data frames buffered per connection while a backend call is in flight.
    /// Once full, the connection is not read until the call completes.
    pub max_pending_frames: usize,

    /// Time allowed for open connections to close after shutdown starts.
    pub drain_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            ws_path: "/ws".to_string(),
            max_pending_frames: 8,
            drain_timeout_secs: 5,
        }
    }
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full URL of the ask endpoint.
    pub url: String,

    /// Total time allowed for one backend call in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/ask".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.listener.ws_path, "/ws");
        assert_eq!(config.listener.max_pending_frames, 8);
        assert_eq!(config.backend.url, "http://localhost:8000/ask");
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [backend]
            url = "http://qa.internal:9000/ask"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.url, "http://qa.internal:9000/ask");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.connect_timeout_secs, 5);
    }
}
