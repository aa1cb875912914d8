use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;

/// Route of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub active_connections: u64,
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_connections: state.connections.active_count(),
    })
}
