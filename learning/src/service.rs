//! ModerationLearning - the assembled learning loop.
//!
//! Constructed once at startup and shared by reference with request
//! handlers. Each instance owns its own state, so tests can build as many
//! independent instances as they need.

use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use shepherd_oracle::{ClassificationOracle, LlmBackend, OracleStats};
use shepherd_taxonomy::{Classification, DecisionDraft, ModeratorDecision};

use crate::classifier::LearningClassifier;
use crate::config::LearningConfig;
use crate::pending::{spawn_sweep_task, PendingPredictions, PendingStats};
use crate::recorder::{DecisionRecorder, RecordStatus};
use crate::reporter::FeedbackReporter;
use crate::store::TrainingCaseStore;
use crate::types::{FeedbackSummary, Result};

/// Operational counters for the learning loop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub model: String,
    pub pending: PendingStats,
    pub total_cases: usize,
    pub oracle: OracleStats,
}

/// Classifier, recorder and reporter wired over shared state.
pub struct ModerationLearning {
    config: LearningConfig,
    oracle: Arc<ClassificationOracle>,
    store: Arc<TrainingCaseStore>,
    pending: Arc<PendingPredictions>,
    classifier: LearningClassifier,
    recorder: DecisionRecorder,
    reporter: FeedbackReporter,
}

impl ModerationLearning {
    /// Build the learning loop over an LLM backend.
    pub fn new(backend: Arc<dyn LlmBackend>, config: LearningConfig) -> Result<Self> {
        config.validate()?;

        let oracle = Arc::new(ClassificationOracle::with_config(
            backend,
            config.oracle.clone(),
        ));
        let store = Arc::new(TrainingCaseStore::open(&config.store)?);
        let pending = Arc::new(PendingPredictions::from_config(&config.pending));

        let classifier = LearningClassifier::new(
            oracle.clone(),
            store.clone(),
            pending.clone(),
            config.classifier.clone(),
        );
        let recorder = DecisionRecorder::new(pending.clone(), store.clone());
        let reporter = FeedbackReporter::new(store.clone(), config.feedback.clone());

        info!(
            model = %oracle.backend_id(),
            pending_capacity = pending.capacity(),
            journal = config.store.journal_path.is_some(),
            "Moderation learning initialized"
        );

        Ok(Self {
            config,
            oracle,
            store,
            pending,
            classifier,
            recorder,
            reporter,
        })
    }

    /// Classify content, remembering the prediction when `content_id` is given.
    pub async fn classify(
        &self,
        content: &str,
        content_type: &str,
        content_id: Option<&str>,
    ) -> Classification {
        self.classifier
            .analyze_with_learning(content, content_type, content_id)
            .await
    }

    /// Record a validated moderator decision.
    pub async fn record_decision(
        &self,
        content_id: &str,
        decision: ModeratorDecision,
    ) -> RecordStatus {
        self.recorder.record_decision(content_id, decision).await
    }

    /// Validate a raw decision, then record it.
    ///
    /// Unknown priorities or actions are rejected before anything is stored.
    pub async fn record_draft(&self, content_id: &str, draft: DecisionDraft) -> Result<RecordStatus> {
        let decision = ModeratorDecision::try_from(draft)?;
        Ok(self.record_decision(content_id, decision).await)
    }

    /// Current performance summary.
    pub async fn get_feedback(&self) -> FeedbackSummary {
        self.reporter.summarize().await
    }

    pub async fn stats(&self) -> LearningStats {
        LearningStats {
            model: self.oracle.backend_id().to_string(),
            pending: self.pending.stats(),
            total_cases: self.store.len().await,
            oracle: self.oracle.audit().stats().await,
        }
    }

    /// Start the periodic purge of expired pending predictions.
    pub fn spawn_maintenance(&self) -> JoinHandle<()> {
        spawn_sweep_task(self.pending.clone(), self.config.pending.sweep_interval())
    }

    pub fn oracle(&self) -> &Arc<ClassificationOracle> {
        &self.oracle
    }

    pub fn store(&self) -> &Arc<TrainingCaseStore> {
        &self.store
    }

    pub fn pending(&self) -> &Arc<PendingPredictions> {
        &self.pending
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LearningError;
    use shepherd_oracle::MockBackend;
    use shepherd_taxonomy::Priority;

    fn learning() -> ModerationLearning {
        let backend = Arc::new(MockBackend::default().with_response(
            r#"{"priority":"low","category":"fellowship","confidence":0.9,"reason":"friendly"}"#,
        ));
        ModerationLearning::new(backend, LearningConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_record_draft_rejects_unknown_priority() {
        let learning = learning();
        learning.classify("Blessings!", "comment", Some("c1")).await;

        let draft = DecisionDraft {
            final_priority: "urgent".to_string(),
            final_category: "fellowship".to_string(),
            action: "approved".to_string(),
            moderator_notes: None,
            moderator_id: "mod-1".to_string(),
        };
        let result = learning.record_draft("c1", draft).await;

        assert!(matches!(result, Err(LearningError::InvalidDecision(_))));
        assert!(learning.store().is_empty().await);
        assert!(learning.pending().get("c1").is_some());
    }

    #[tokio::test]
    async fn test_stats() {
        let learning = learning();
        let c = learning.classify("Blessings!", "comment", Some("c1")).await;
        assert_eq!(c.priority, Priority::Low);

        let stats = learning.stats().await;
        assert_eq!(stats.model, "mock-model");
        assert_eq!(stats.pending.size, 1);
        assert_eq!(stats.total_cases, 0);
        assert_eq!(stats.oracle.total_calls, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = LearningConfig::default();
        config.pending.capacity = 0;
        let result = ModerationLearning::new(Arc::new(MockBackend::default()), config);
        assert!(matches!(result, Err(LearningError::Config(_))));
    }
}
