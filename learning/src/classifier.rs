//! Learning-enabled classifier.
//!
//! Wraps the oracle with lessons from past moderator corrections and keeps
//! each fresh classification pending until a moderator decides.

use std::sync::Arc;
use tracing::debug;

use shepherd_oracle::ClassificationOracle;
use shepherd_taxonomy::Classification;

use crate::config::ClassifierConfig;
use crate::pending::PendingPredictions;
use crate::store::TrainingCaseStore;
use crate::types::{MisclassificationPattern, PendingPrediction};

/// Classifier that feeds past corrections back into the oracle prompt.
pub struct LearningClassifier {
    oracle: Arc<ClassificationOracle>,
    store: Arc<TrainingCaseStore>,
    pending: Arc<PendingPredictions>,
    config: ClassifierConfig,
}

impl LearningClassifier {
    pub fn new(
        oracle: Arc<ClassificationOracle>,
        store: Arc<TrainingCaseStore>,
        pending: Arc<PendingPredictions>,
        config: ClassifierConfig,
    ) -> Self {
        Self {
            oracle,
            store,
            pending,
            config,
        }
    }

    /// Classify content using the most frequent correction patterns as hints.
    ///
    /// With a `content_id`, the result becomes the pending prediction for that
    /// content, replacing any earlier one. A fallback verdict is never kept:
    /// it clears the earlier prediction and leaves nothing to score.
    pub async fn analyze_with_learning(
        &self,
        content: &str,
        content_type: &str,
        content_id: Option<&str>,
    ) -> Classification {
        let patterns: Vec<MisclassificationPattern> = self
            .store
            .recent_misclassifications(self.config.max_hints)
            .await
            .into_iter()
            .filter(|p| p.frequency >= self.config.hint_min_frequency)
            .collect();

        let hint = render_hint(&patterns);
        debug!(
            content_type = %content_type,
            hints = patterns.len(),
            "Classifying with learned hints"
        );

        let classification = self
            .oracle
            .classify(content, content_type, hint.as_deref())
            .await;

        let Some(content_id) = content_id.filter(|id| !id.trim().is_empty()) else {
            return classification;
        };

        if classification.is_fallback() {
            // No model verdict to score; an older prediction was for other text.
            if self.pending.take(content_id).is_some() {
                debug!(content_id = %content_id, "Dropped superseded pending prediction");
            }
            debug!(content_id = %content_id, "Fallback verdict not kept for learning");
        } else {
            self.pending.insert(PendingPrediction::new(
                content_id,
                content,
                content_type,
                classification.clone(),
            ));
        }

        classification
    }
}

/// One hint line per pattern, or `None` when there is nothing to learn from.
pub fn render_hint(patterns: &[MisclassificationPattern]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }
    Some(
        patterns
            .iter()
            .map(MisclassificationPattern::hint)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
