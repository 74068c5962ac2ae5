//! HTTP routes for the Shepherd gateway

pub mod health;
pub mod moderation;

pub use health::{health_check, HealthResponse};
pub use moderation::{
    handle_classify, handle_feedback, handle_record_decision, handle_stats, ClassifyRequest,
    DecisionRequest,
};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

/// Serialize `value` as a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .header("Cache-Control", "no-store")
            .body(Full::new(Bytes::from(body)))
            .unwrap(),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal serialization error")
        }
    }
}

/// JSON error body `{"error": ..., "message": ...}`.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message,
    });

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Bad request response
pub fn bad_request_response(message: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, message)
}
