//! qa-relay server
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  QA RELAY                    │
//!     WebSocket frame  │  ┌──────────┐   ┌────────────┐   ┌────────┐  │   POST /ask
//!     ─────────────────┼─▶│   http   │──▶│ websocket  │──▶│ relay  │──┼──────────────▶ Backend
//!                      │  │  server  │   │ frame loop │   │ client │  │
//!     ◀────────────────┼──│          │◀──│            │◀──│        │◀─┼─────────────── (JSON)
//!     reply frame      │  └──────────┘   └────────────┘   └────────┘  │
//!                      │                                              │
//!                      │  config · lifecycle · net · observability    │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use qa_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use qa_relay::lifecycle::{self, Shutdown};
use qa_relay::observability::init_logging;

#[derive(Parser)]
#[command(name = "qa-relay", version)]
#[command(about = "Relay WebSocket questions to a question-answering backend", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override backend.url.
    #[arg(long)]
    backend_url: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(url) = self.backend_url {
            config.backend.url = url;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability);

    tracing::info!("qa-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_url = %config.backend.url,
        backend_timeout_secs = config.backend.timeout_secs,
        "Configuration loaded"
    );

    let started = lifecycle::start(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    started.server.run(started.listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
