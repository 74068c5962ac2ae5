//! ClassificationOracle - turns an LLM backend into a content classifier.
//!
//! Classification failures are never fatal to the content pipeline: every
//! error path ends in [`Classification::fallback`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use shepherd_taxonomy::{Classification, PromptAssembler};

use crate::audit::{CallResult, OracleAudit, OracleCall, MAX_AUDIT_ENTRIES};
use crate::backend::traits::{CompletionRequest, LlmBackend, LlmError};
use crate::parse::{parse_classification, ParseError};

/// Why a classification attempt fell back.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Nothing to classify
    #[error("Content is empty")]
    EmptyContent,

    /// Backend did not answer in time
    #[error("Oracle timed out after {0}ms")]
    Timeout(u64),

    /// Backend error
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Reply could not be parsed
    #[error("Unusable reply: {0}")]
    Parse(#[from] ParseError),
}

/// Configuration for the classification oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Upper bound on a single oracle call (ms)
    pub timeout_ms: u64,
    /// Maximum tokens the model may generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Audit entries to retain
    pub audit_capacity: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_tokens: 300,
            temperature: 0.1,
            audit_capacity: MAX_AUDIT_ENTRIES,
        }
    }
}

/// Content classifier backed by an LLM.
pub struct ClassificationOracle {
    backend: Arc<dyn LlmBackend>,
    config: OracleConfig,
    system_prompt: String,
    audit: Arc<OracleAudit>,
}

impl ClassificationOracle {
    /// Create an oracle over the given backend with default configuration.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self::with_config(backend, OracleConfig::default())
    }

    /// Create with configuration.
    pub fn with_config(backend: Arc<dyn LlmBackend>, config: OracleConfig) -> Self {
        Self {
            backend,
            audit: Arc::new(OracleAudit::with_max_entries(config.audit_capacity)),
            system_prompt: PromptAssembler::build_system_prompt(),
            config,
        }
    }

    /// Backend model identifier.
    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Whether the backend is currently reachable.
    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    /// Call audit log.
    pub fn audit(&self) -> &Arc<OracleAudit> {
        &self.audit
    }

    /// Classify content.
    ///
    /// `content_type` is advisory context for the model and is not validated.
    /// `context_hint` is extra guidance placed ahead of the content. Never
    /// fails: errors are logged, audited and replaced by the fallback.
    pub async fn classify(
        &self,
        content: &str,
        content_type: &str,
        context_hint: Option<&str>,
    ) -> Classification {
        let start = Instant::now();
        let result = self.try_classify(content, content_type, context_hint).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (classification, call_result) = match result {
            Ok(classification) => {
                debug!(
                    model = %self.backend.id(),
                    priority = %classification.priority,
                    category = %classification.category,
                    confidence = classification.confidence,
                    latency_ms,
                    "Content classified"
                );
                let priority = classification.priority;
                (classification, CallResult::Classified { priority })
            }
            Err(e) => {
                warn!(
                    model = %self.backend.id(),
                    content_type = %content_type,
                    error = %e,
                    latency_ms,
                    "Classification unavailable, using fallback"
                );
                (
                    Classification::fallback(),
                    CallResult::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        self.audit
            .record(OracleCall::new(
                self.backend.id(),
                content_type,
                call_result,
                latency_ms,
            ))
            .await;

        classification
    }

    /// Classify content, surfacing the failure reason.
    pub async fn try_classify(
        &self,
        content: &str,
        content_type: &str,
        context_hint: Option<&str>,
    ) -> Result<Classification, OracleError> {
        if content.trim().is_empty() {
            return Err(OracleError::EmptyContent);
        }

        let user_prompt =
            PromptAssembler::build_classification_prompt(content, content_type, context_hint);

        let request = CompletionRequest::user(user_prompt)
            .with_system(self.system_prompt.as_str())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature)
            .with_json_output();

        let completion = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            self.backend.complete(request),
        )
        .await
        .map_err(|_| OracleError::Timeout(self.config.timeout_ms))??;

        Ok(parse_classification(&completion.content)?)
    }
}
