//! Moderation endpoints
//!
//! - POST /classify - classify content for the review queue
//! - POST /decisions - record what a moderator decided
//! - GET /feedback - learning loop performance summary
//! - GET /stats - operational counters
//!
//! Classification never fails from the dashboard's point of view: when the
//! oracle is unavailable the response carries the fallback verdict. Only
//! malformed requests are rejected.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use shepherd_learning::{LearningError, ModerationLearning};
use shepherd_taxonomy::DecisionDraft;

use super::{bad_request_response, error_response, json_response};

/// Request body for POST /classify
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    pub content: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content_id: Option<String>,
}

/// Request body for POST /decisions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub content_id: String,
    #[serde(flatten)]
    pub decision: DecisionDraft,
}

/// Handle POST /classify
pub async fn handle_classify(learning: &ModerationLearning, body: &Bytes) -> Response<Full<Bytes>> {
    let request: ClassifyRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Classify request JSON parse error: {}", e);
            return bad_request_response(&format!("Invalid JSON: {}", e));
        }
    };

    if request.content.trim().is_empty() {
        return bad_request_response("content must not be empty");
    }

    debug!(
        content_type = %request.content_type,
        content_id = ?request.content_id,
        "Classify request"
    );

    let classification = learning
        .classify(
            &request.content,
            &request.content_type,
            request.content_id.as_deref(),
        )
        .await;

    json_response(StatusCode::OK, &classification)
}

/// Handle POST /decisions
pub async fn handle_record_decision(
    learning: &ModerationLearning,
    body: &Bytes,
) -> Response<Full<Bytes>> {
    let request: DecisionRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Decision request JSON parse error: {}", e);
            return bad_request_response(&format!("Invalid JSON: {}", e));
        }
    };

    let content_id = request.content_id.trim();
    if content_id.is_empty() {
        return bad_request_response("contentId must not be empty");
    }

    match learning.record_draft(content_id, request.decision).await {
        Ok(status) => json_response(StatusCode::OK, &status),
        Err(LearningError::InvalidDecision(e)) => {
            warn!(content_id = %content_id, error = %e, "Rejected moderator decision");
            bad_request_response(&e.to_string())
        }
        Err(e) => {
            warn!(content_id = %content_id, error = %e, "Failed to record decision");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Handle GET /feedback
pub async fn handle_feedback(learning: &ModerationLearning) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &learning.get_feedback().await)
}

/// Handle GET /stats
pub async fn handle_stats(learning: &ModerationLearning) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &learning.stats().await)
}
