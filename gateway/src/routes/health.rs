//! Health check endpoint
//!
//! Liveness probe for the gateway. Always 200 while the process runs; the
//! `status` field reports `degraded` when the LLM backend is unreachable,
//! since classification then only returns fallback verdicts.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::json_response;
use crate::server::AppState;

/// Health response for the moderation dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service is running
    pub healthy: bool,
    /// 'online' or 'degraded'
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    /// Current timestamp
    pub timestamp: String,
    /// Classification model
    pub model: String,
    /// Whether the LLM backend answered its probe
    pub backend_available: bool,
}

/// Build health response with current state
async fn build_health_response(state: &AppState) -> HealthResponse {
    let oracle = state.learning.oracle();
    let backend_available = oracle.is_available().await;

    HealthResponse {
        healthy: true,
        status: if backend_available { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model: oracle.backend_id().to_string(),
        backend_available,
    }
}

/// Handle GET /health
pub async fn health_check(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(state).await)
}
