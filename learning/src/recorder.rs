//! Decision recorder.
//!
//! Joins a moderator decision with the pending prediction for the same
//! content and files the result as a training case.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use shepherd_taxonomy::{ModeratorDecision, Outcome};

use crate::pending::PendingPredictions;
use crate::store::TrainingCaseStore;
use crate::types::TrainingCase;

/// What happened to a recorded decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    /// Matched a pending prediction and produced a training case
    #[serde(rename_all = "camelCase")]
    Recorded { case_id: String, outcome: Outcome },
    /// No pending prediction for that content
    Unmatched,
}

impl RecordStatus {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Recorded { outcome, .. } => Some(*outcome),
            Self::Unmatched => None,
        }
    }
}

/// Turns moderator decisions into training cases.
pub struct DecisionRecorder {
    pending: Arc<PendingPredictions>,
    store: Arc<TrainingCaseStore>,
}

impl DecisionRecorder {
    pub fn new(pending: Arc<PendingPredictions>, store: Arc<TrainingCaseStore>) -> Self {
        Self { pending, store }
    }

    /// Record a validated decision for `content_id`.
    ///
    /// A decision without a pending prediction is logged and ignored. Store
    /// failures are logged; the moderator's workflow never sees them.
    pub async fn record_decision(
        &self,
        content_id: &str,
        decision: ModeratorDecision,
    ) -> RecordStatus {
        let Some(prediction) = self.pending.take(content_id) else {
            info!(
                content_id = %content_id,
                moderator_id = %decision.moderator_id,
                "No pending prediction for decision, skipping"
            );
            return RecordStatus::Unmatched;
        };

        let case = TrainingCase::from_prediction(prediction, decision);
        let case_id = case.case_id.clone();
        let outcome = case.outcome;

        info!(
            content_id = %content_id,
            case_id = %case_id,
            ai_priority = %case.ai_priority(),
            human_priority = %case.human_priority(),
            outcome = %outcome,
            category_corrected = case.category_corrected,
            "Moderator decision recorded"
        );

        if let Err(e) = self.store.add(case).await {
            warn!(case_id = %case_id, error = %e, "Training case not persisted");
        }

        RecordStatus::Recorded { case_id, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PendingPrediction;
    use shepherd_taxonomy::{Classification, ModeratorAction, Priority};

    fn recorder() -> (Arc<PendingPredictions>, Arc<TrainingCaseStore>, DecisionRecorder) {
        let pending = Arc::new(PendingPredictions::new(100));
        let store = Arc::new(TrainingCaseStore::new());
        let recorder = DecisionRecorder::new(pending.clone(), store.clone());
        (pending, store, recorder)
    }

    fn pend(pending: &PendingPredictions, content_id: &str, priority: Priority) {
        pending.insert(PendingPrediction::new(
            content_id,
            "text",
            "comment",
            Classification::new(priority, "general", 0.8, "test"),
        ));
    }

    fn decide(priority: Priority) -> ModeratorDecision {
        ModeratorDecision::new(priority, "general", ModeratorAction::Approved, "mod-1")
    }

    #[tokio::test]
    async fn test_outcomes_by_ordinal() {
        let (pending, store, recorder) = recorder();

        for ai in Priority::ALL {
            for human in Priority::ALL {
                let id = format!("{}-{}", ai, human);
                pend(&pending, &id, ai);
                let status = recorder.record_decision(&id, decide(human)).await;

                let expected = if ai == human {
                    Outcome::Correct
                } else if ai < human {
                    Outcome::UnderClassified
                } else {
                    Outcome::OverClassified
                };
                assert_eq!(status.outcome(), Some(expected), "{} -> {}", ai, human);
            }
        }

        assert_eq!(store.len().await, 16);
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_decision_is_noop() {
        let (_, store, recorder) = recorder();

        let status = recorder.record_decision("never-seen", decide(Priority::High)).await;

        assert_eq!(status, RecordStatus::Unmatched);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_second_decision_is_unmatched() {
        let (pending, store, recorder) = recorder();
        pend(&pending, "c1", Priority::Low);

        recorder.record_decision("c1", decide(Priority::Low)).await;
        let again = recorder.record_decision("c1", decide(Priority::High)).await;

        assert_eq!(again, RecordStatus::Unmatched);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(RecordStatus::Recorded {
            case_id: "abc".to_string(),
            outcome: Outcome::UnderClassified,
        })
        .unwrap();
        assert_eq!(json["status"], "recorded");
        assert_eq!(json["caseId"], "abc");
        assert_eq!(json["outcome"], "under_classified");

        let json = serde_json::to_value(RecordStatus::Unmatched).unwrap();
        assert_eq!(json["status"], "unmatched");
    }
}
