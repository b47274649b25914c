//! Basic handlers - health check and status.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

use super::ServerState;

const SERVICE_NAME: &str = "sensorlink";

/// Detailed health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: &'static str,
    pub uptime: u64,
    pub gateway_name: String,
    pub latency_benchmark: bool,
}

/// Basic health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check with uptime and gateway identity.
pub async fn health_status_handler(State(state): State<ServerState>) -> Json<HealthStatus> {
    let uptime = chrono::Utc::now().timestamp() - state.started_at;

    Json(HealthStatus {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime: uptime.max(0) as u64,
        gateway_name: state.config.gateway_name.clone(),
        latency_benchmark: state.dispatcher.latency_benchmark_enabled(),
    })
}
