//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server (and its backend client) from validated configuration
//! - Bind the listener last, so traffic only arrives when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::RelayServer;
use crate::relay::ClientBuildError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("relay client: {0}")]
    Client(#[from] ClientBuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A server ready to run, with its bound listener.
pub struct Started {
    pub server: RelayServer,
    pub listener: TcpListener,
    pub local_addr: SocketAddr,
}

/// Initialize the relay and bind its listener.
pub async fn start(config: RelayConfig) -> Result<Started, StartupError> {
    let bind_address = config.listener.bind_address.clone();
    let server = RelayServer::new(config)?;

    let bind_err = |source| StartupError::Bind {
        addr: bind_address.clone(),
        source,
    };
    let listener = TcpListener::bind(bind_address.as_str()).await.map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;

    tracing::info!(address = %local_addr, "Listening for connections");

    Ok(Started {
        server,
        listener,
        local_addr,
    })
}
