//! Core types for the learning loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shepherd_taxonomy::prompt::truncate_chars;
use shepherd_taxonomy::{
    normalize_category, Classification, ModeratorDecision, Outcome, Priority, TaxonomyError,
};

/// Characters of content kept as a pattern example.
pub const EXAMPLE_SNIPPET_CHARS: usize = 60;

/// An AI classification waiting for a moderator decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPrediction {
    /// Content this prediction is about
    pub content_id: String,
    /// Text that was classified
    pub content: String,
    /// Advisory content type passed to the oracle
    pub content_type: String,
    /// What the oracle said
    pub classification: Classification,
    /// When the classification was made
    pub classified_at: DateTime<Utc>,
}

impl PendingPrediction {
    pub fn new(
        content_id: impl Into<String>,
        content: impl Into<String>,
        content_type: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            content: content.into(),
            content_type: content_type.into(),
            classification,
            classified_at: Utc::now(),
        }
    }
}

/// A moderator decision joined with the AI prediction it settled.
///
/// Immutable once created; the store only ever appends these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCase {
    /// Unique case ID
    pub case_id: String,
    /// Content the prediction was made for
    pub content_id: String,
    /// Text as classified
    pub content: String,
    /// Content type as supplied by the caller
    pub content_type: String,
    /// Oracle verdict at prediction time
    pub ai_classification: Classification,
    /// What the moderator decided
    pub human_decision: ModeratorDecision,
    /// Priority comparison of the two
    pub outcome: Outcome,
    /// Moderator chose a different category label
    #[serde(default)]
    pub category_corrected: bool,
    /// When the decision was recorded
    pub timestamp: DateTime<Utc>,
}

impl TrainingCase {
    /// Settle a pending prediction with a moderator decision.
    pub fn from_prediction(prediction: PendingPrediction, decision: ModeratorDecision) -> Self {
        let outcome = Outcome::between(
            prediction.classification.priority,
            decision.final_priority,
        );
        let human_category = normalize_category(&decision.final_category);
        let category_corrected = !human_category.is_empty()
            && human_category != normalize_category(&prediction.classification.category);

        Self {
            case_id: uuid::Uuid::new_v4().to_string(),
            content_id: prediction.content_id,
            content: prediction.content,
            content_type: prediction.content_type,
            ai_classification: prediction.classification,
            human_decision: decision,
            outcome,
            category_corrected,
            timestamp: Utc::now(),
        }
    }

    pub fn ai_priority(&self) -> Priority {
        self.ai_classification.priority
    }

    pub fn human_priority(&self) -> Priority {
        self.human_decision.final_priority
    }

    /// Whether the moderator changed the priority tier.
    pub fn is_misclassified(&self) -> bool {
        self.outcome != Outcome::Correct
    }

    /// Normalized human category, falling back to the AI one when blank.
    pub fn effective_category(&self) -> String {
        let human = normalize_category(&self.human_decision.final_category);
        if human.is_empty() {
            normalize_category(&self.ai_classification.category)
        } else {
            human
        }
    }
}

/// A recurring `(predicted, corrected)` priority pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisclassificationPattern {
    pub ai_predicted: Priority,
    pub human_corrected: Priority,
    /// Cases with this pair
    pub frequency: usize,
    /// Most frequent human category among those cases
    pub category: String,
    /// Snippet of the most recent matching content
    pub example: String,
    /// Content type of the most recent matching content
    pub content_type: String,
}

impl MisclassificationPattern {
    pub fn outcome(&self) -> Outcome {
        Outcome::between(self.ai_predicted, self.human_corrected)
    }

    /// Distance between the two tiers.
    pub fn severity_gap(&self) -> u8 {
        self.ai_predicted.ordinal().abs_diff(self.human_corrected.ordinal())
    }

    /// Natural-language lesson for the oracle prompt.
    pub fn hint(&self) -> String {
        format!(
            "Note: content resembling \"{}\" ({}) has previously been {} as {} when it should be {} (corrected {} {}).",
            truncate_chars(&self.example, EXAMPLE_SNIPPET_CHARS),
            self.category,
            self.outcome().describe(),
            self.ai_predicted,
            self.human_corrected,
            self.frequency,
            if self.frequency == 1 { "time" } else { "times" },
        )
    }
}

/// Counts of each outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeBreakdown {
    pub correct: usize,
    pub under_classified: usize,
    pub over_classified: usize,
}

impl OutcomeBreakdown {
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::UnderClassified => self.under_classified += 1,
            Outcome::OverClassified => self.over_classified += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.correct + self.under_classified + self.over_classified
    }
}

/// A recurring category relabel at an unchanged priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCorrection {
    pub ai_category: String,
    pub human_category: String,
    pub frequency: usize,
}

/// Performance summary over every recorded case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
    pub total_cases: usize,
    /// Fraction of cases scored correct; 0 when there are none
    pub accuracy_rate: f64,
    pub common_misclassifications: Vec<MisclassificationPattern>,
    pub improvement_suggestions: Vec<String>,
    pub outcome_breakdown: OutcomeBreakdown,
    pub category_corrections: Vec<CategoryCorrection>,
}

impl FeedbackSummary {
    pub fn empty() -> Self {
        Self {
            total_cases: 0,
            accuracy_rate: 0.0,
            common_misclassifications: Vec::new(),
            improvement_suggestions: Vec::new(),
            outcome_breakdown: OutcomeBreakdown::default(),
            category_corrections: Vec::new(),
        }
    }
}

/// Error types for the learning subsystem.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Journal I/O error
    #[error("Journal error: {0}")]
    Journal(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decision rejected at the validation boundary
    #[error("Invalid decision: {0}")]
    InvalidDecision(#[from] TaxonomyError),
}

/// Result type for the learning subsystem.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shepherd_taxonomy::ModeratorAction;

    fn prediction(priority: Priority, category: &str) -> PendingPrediction {
        PendingPrediction::new(
            "post-1",
            "Hey babe! you look mighty fine.",
            "comment",
            Classification::new(priority, category, 0.7, "flirtatious"),
        )
    }

    #[test]
    fn test_case_from_prediction() {
        let decision =
            ModeratorDecision::new(Priority::High, "sexual_content", ModeratorAction::Hidden, "mod-1");
        let case = TrainingCase::from_prediction(prediction(Priority::Medium, "sexual_content"), decision);

        assert_eq!(case.outcome, Outcome::UnderClassified);
        assert!(case.is_misclassified());
        assert!(!case.category_corrected);
        assert_eq!(case.content_id, "post-1");
        assert!(uuid::Uuid::parse_str(&case.case_id).is_ok());
    }

    #[test]
    fn test_category_corrected_ignores_formatting() {
        let same = ModeratorDecision::new(Priority::Medium, "Sexual Content", ModeratorAction::Hidden, "m");
        let case = TrainingCase::from_prediction(prediction(Priority::Medium, "sexual_content"), same);
        assert!(!case.category_corrected);

        let relabel = ModeratorDecision::new(Priority::Medium, "harassment", ModeratorAction::Hidden, "m");
        let case = TrainingCase::from_prediction(prediction(Priority::Medium, "sexual_content"), relabel);
        assert!(case.category_corrected);
        assert_eq!(case.outcome, Outcome::Correct);
    }

    #[test]
    fn test_pattern_hint() {
        let pattern = MisclassificationPattern {
            ai_predicted: Priority::High,
            human_corrected: Priority::Low,
            frequency: 3,
            category: "fellowship".to_string(),
            example: "Praise God for this sunny Sunday".to_string(),
            content_type: "discussion".to_string(),
        };

        assert_eq!(pattern.severity_gap(), 2);
        assert_eq!(pattern.outcome(), Outcome::OverClassified);
        assert_eq!(
            pattern.hint(),
            "Note: content resembling \"Praise God for this sunny Sunday\" (fellowship) has previously been over-classified as high when it should be low (corrected 3 times)."
        );
    }

    #[test]
    fn test_summary_wire_format() {
        let json = serde_json::to_value(FeedbackSummary::empty()).unwrap();
        assert_eq!(json["totalCases"], 0);
        assert_eq!(json["accuracyRate"], 0.0);
        assert!(json["commonMisclassifications"].as_array().unwrap().is_empty());
        assert_eq!(json["outcomeBreakdown"]["underClassified"], 0);
    }
}
