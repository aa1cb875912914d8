//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the WebSocket and health handlers
//! - Build the shared relay client once, at startup
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown is signalled

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::health::{get_health, HEALTH_PATH};
use crate::http::websocket::ws_handler;
use crate::net::ConnectionTracker;
use crate::relay::{ClientBuildError, RelayClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayClient>,
    pub connections: ConnectionTracker,
    /// Data frames a connection may buffer during one backend call.
    pub max_pending_frames: usize,
    /// Flips to `true` when the server starts shutting down.
    pub closing: Arc<watch::Sender<bool>>,
}

/// WebSocket relay server.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
    state: AppState,
}

impl RelayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ClientBuildError> {
        let relay = Arc::new(RelayClient::new(&config.backend)?);
        let (closing, _) = watch::channel(false);

        let state = AppState {
            relay,
            connections: ConnectionTracker::new(),
            max_pending_frames: config.listener.max_pending_frames,
            closing: Arc::new(closing),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.listener.ws_path, get(ws_handler))
            .route(HEALTH_PATH, get(get_health))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns once `shutdown` fires, the listener has stopped and open
    /// WebSocket connections have closed (or `drain_timeout_secs` elapsed).
    /// Upgraded connections are not tracked by the HTTP server itself, so the
    /// drain waits on the connection tracker.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            ws_path = %self.config.listener.ws_path,
            backend = %self.state.relay.endpoint(),
            "Relay server starting"
        );

        let closing = Arc::clone(&self.state.closing);
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
                closing.send_replace(true);
            })
            .await?;

        let connections = self.state.connections;
        let drain_timeout = Duration::from_secs(self.config.listener.drain_timeout_secs);
        tracing::info!(
            active_connections = connections.active_count(),
            "Draining WebSocket connections"
        );
        if tokio::time::timeout(drain_timeout, connections.wait_for_shutdown())
            .await
            .is_err()
        {
            tracing::warn!(
                active_connections = connections.active_count(),
                drain_timeout_secs = self.config.listener.drain_timeout_secs,
                "Drain deadline elapsed, dropping remaining connections"
            );
        }

        tracing::info!("Relay server stopped");
        Ok(())
    }

    /// Handle on the live connection count.
    pub fn connections(&self) -> ConnectionTracker {
        self.state.connections.clone()
    }
}
