//! Feedback reporter.
//!
//! Summarizes every recorded case into accuracy, recurring misclassification
//! patterns and advisory improvement suggestions. Recomputed on each call,
//! so a summary always reflects the latest cases.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use shepherd_taxonomy::{normalize_category, Outcome, Priority};

use crate::config::FeedbackConfig;
use crate::store::{group_misclassifications, TrainingCaseStore};
use crate::types::{CategoryCorrection, FeedbackSummary, OutcomeBreakdown, TrainingCase};

/// Category fragments treated as everyday social conversation.
const CASUAL_CATEGORY_MARKERS: &[&str] = &[
    "casual",
    "social",
    "friendly",
    "greeting",
    "fellowship",
    "community",
    "encouragement",
    "humor",
];

/// Builds [`FeedbackSummary`] values from the case store.
pub struct FeedbackReporter {
    store: Arc<TrainingCaseStore>,
    config: FeedbackConfig,
}

impl FeedbackReporter {
    pub fn new(store: Arc<TrainingCaseStore>, config: FeedbackConfig) -> Self {
        Self { store, config }
    }

    /// Summarize the store's current contents.
    pub async fn summarize(&self) -> FeedbackSummary {
        let cases = self.store.all().await;
        let summary = summarize_cases(&cases, &self.config);
        debug!(
            total_cases = summary.total_cases,
            accuracy_rate = summary.accuracy_rate,
            patterns = summary.common_misclassifications.len(),
            suggestions = summary.improvement_suggestions.len(),
            "Feedback summary computed"
        );
        summary
    }
}

/// Summarize a set of cases. Deterministic for a given input.
pub fn summarize_cases(cases: &[TrainingCase], config: &FeedbackConfig) -> FeedbackSummary {
    if cases.is_empty() {
        return FeedbackSummary::empty();
    }

    let mut breakdown = OutcomeBreakdown::default();
    for case in cases {
        breakdown.add(case.outcome);
    }

    let total_cases = cases.len();
    let accuracy_rate = breakdown.correct as f64 / total_cases as f64;

    let common_misclassifications = group_misclassifications(cases)
        .into_iter()
        .filter(|p| p.frequency >= config.min_pattern_frequency)
        .collect();

    let category_corrections: Vec<CategoryCorrection> = relabels(cases)
        .into_iter()
        .filter(|c| c.frequency >= config.min_pattern_frequency)
        .collect();

    let improvement_suggestions = suggestions(cases, &breakdown, accuracy_rate, config);

    FeedbackSummary {
        total_cases,
        accuracy_rate,
        common_misclassifications,
        improvement_suggestions,
        outcome_breakdown: breakdown,
        category_corrections,
    }
}

/// Category relabels where the moderator kept the AI's priority.
fn relabels(cases: &[TrainingCase]) -> Vec<CategoryCorrection> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for case in cases
        .iter()
        .filter(|c| c.category_corrected && c.outcome == Outcome::Correct)
    {
        let key = (
            normalize_category(&case.ai_classification.category),
            normalize_category(&case.human_decision.final_category),
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut corrections: Vec<CategoryCorrection> = counts
        .into_iter()
        .map(|((ai_category, human_category), frequency)| CategoryCorrection {
            ai_category,
            human_category,
            frequency,
        })
        .collect();
    // Stable sort keeps the map's alphabetical order among equal counts.
    corrections.sort_by_key(|c| Reverse(c.frequency));
    corrections
}

fn is_casual(category: &str) -> bool {
    CASUAL_CATEGORY_MARKERS
        .iter()
        .any(|marker| category.contains(marker))
}

fn suggestions(
    cases: &[TrainingCase],
    breakdown: &OutcomeBreakdown,
    accuracy_rate: f64,
    config: &FeedbackConfig,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    let mut by_category: BTreeMap<String, OutcomeBreakdown> = BTreeMap::new();
    for case in cases.iter().filter(|c| c.is_misclassified()) {
        by_category
            .entry(case.effective_category())
            .or_default()
            .add(case.outcome);
    }

    for (category, tally) in &by_category {
        let (under, over) = (tally.under_classified, tally.over_classified);

        if under >= config.min_suggestion_count && under > over {
            suggestions.push(format!(
                "Increase sensitivity to {} content: {} cases were rated less severe than moderators judged them.",
                category, under
            ));
        } else if over >= config.min_suggestion_count && over > under {
            if is_casual(category) {
                suggestions.push(format!(
                    "Reduce false positives on casual language: {} {} cases were rated more severe than moderators judged them.",
                    over, category
                ));
            } else {
                suggestions.push(format!(
                    "Relax {} thresholds: {} cases were rated more severe than moderators judged them.",
                    category, over
                ));
            }
        }
    }

    let missed_critical = cases
        .iter()
        .filter(|c| c.human_priority() == Priority::Critical && c.ai_priority() < Priority::Critical)
        .count();
    if missed_critical > 0 {
        suggestions.push(format!(
            "Escalate sooner: {} critical {} classified below critical; treat privacy, safety and exploitation signals as critical.",
            missed_critical,
            if missed_critical == 1 { "item was" } else { "items were" }
        ));
    }

    for relabel in relabels(cases)
        .into_iter()
        .filter(|c| c.frequency >= config.min_suggestion_count)
    {
        suggestions.push(format!(
            "Review category labelling: moderators relabelled '{}' as '{}' {} times at the same priority.",
            relabel.ai_category, relabel.human_category, relabel.frequency
        ));
    }

    if breakdown.total() >= config.low_accuracy_min_cases
        && accuracy_rate < config.low_accuracy_threshold
    {
        suggestions.push(format!(
            "Overall accuracy is {:.0}%; review the classification prompt and tier guidance.",
            accuracy_rate * 100.0
        ));
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PendingPrediction;
    use shepherd_taxonomy::{Classification, ModeratorAction, ModeratorDecision};

    fn case(ai: Priority, ai_cat: &str, human: Priority, human_cat: &str) -> TrainingCase {
        TrainingCase::from_prediction(
            PendingPrediction::new(
                uuid::Uuid::new_v4().to_string(),
                "some content",
                "comment",
                Classification::new(ai, ai_cat, 0.7, "test"),
            ),
            ModeratorDecision::new(human, human_cat, ModeratorAction::Approved, "mod-1"),
        )
    }

    fn has(summary: &FeedbackSummary, needle: &str) -> bool {
        summary.improvement_suggestions.iter().any(|s| s.contains(needle))
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_cases(&[], &FeedbackConfig::default());
        assert_eq!(summary, FeedbackSummary::empty());
        assert_eq!(summary.accuracy_rate, 0.0);
    }

    #[test]
    fn test_under_classification_suggestion() {
        let cases = vec![
            case(Priority::Medium, "flirtation", Priority::High, "sexual_content"),
            case(Priority::Low, "flirtation", Priority::High, "sexual_content"),
        ];
        let summary = summarize_cases(&cases, &FeedbackConfig::default());

        assert!(has(&summary, "Increase sensitivity to sexual_content"));
        assert_eq!(summary.outcome_breakdown.under_classified, 2);
        assert_eq!(summary.accuracy_rate, 0.0);
    }

    #[test]
    fn test_over_classification_casual_vs_other() {
        let casual = vec![
            case(Priority::High, "fellowship", Priority::Low, "fellowship"),
            case(Priority::Medium, "fellowship", Priority::Low, "fellowship"),
        ];
        let summary = summarize_cases(&casual, &FeedbackConfig::default());
        assert!(has(&summary, "Reduce false positives on casual language"));

        let other = vec![
            case(Priority::High, "spam", Priority::Low, "spam"),
            case(Priority::High, "spam", Priority::Medium, "spam"),
        ];
        let summary = summarize_cases(&other, &FeedbackConfig::default());
        assert!(has(&summary, "Relax spam thresholds"));
    }

    #[test]
    fn test_missed_critical_escalation() {
        let cases = vec![case(
            Priority::Medium,
            "privacy_violation",
            Priority::Critical,
            "privacy_violation",
        )];
        let summary = summarize_cases(&cases, &FeedbackConfig::default());
        assert!(has(&summary, "Escalate sooner: 1 critical item was"));
        assert!(summary.common_misclassifications.is_empty());
    }

    #[test]
    fn test_category_relabels() {
        let cases = vec![
            case(Priority::High, "sexual_content", Priority::High, "harassment"),
            case(Priority::High, "sexual_content", Priority::High, "Harassment"),
        ];
        let summary = summarize_cases(&cases, &FeedbackConfig::default());

        assert_eq!(summary.accuracy_rate, 1.0);
        assert_eq!(summary.category_corrections.len(), 1);
        assert_eq!(summary.category_corrections[0].human_category, "harassment");
        assert_eq!(summary.category_corrections[0].frequency, 2);
        assert!(has(&summary, "Review category labelling"));
    }

    #[test]
    fn test_low_accuracy_rule() {
        let mut cases: Vec<TrainingCase> = (0..5)
            .map(|_| case(Priority::Low, "general", Priority::Low, "general"))
            .collect();
        cases.extend((0..5).map(|_| case(Priority::Low, "general", Priority::Medium, "general")));

        let summary = summarize_cases(&cases, &FeedbackConfig::default());
        assert_eq!(summary.accuracy_rate, 0.5);
        assert!(has(&summary, "Overall accuracy is 50%"));

        let few = &cases[5..];
        let summary = summarize_cases(few, &FeedbackConfig::default());
        assert!(!has(&summary, "Overall accuracy"));
    }

    #[test]
    fn test_frequency_threshold_on_patterns() {
        let cases = vec![
            case(Priority::Medium, "a", Priority::High, "a"),
            case(Priority::Medium, "a", Priority::High, "a"),
            case(Priority::Low, "b", Priority::Medium, "b"),
        ];
        let summary = summarize_cases(&cases, &FeedbackConfig::default());
        assert_eq!(summary.common_misclassifications.len(), 1);
        assert_eq!(summary.common_misclassifications[0].frequency, 2);
    }
}
