//! Moderator decisions and outcome scoring.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::TaxonomyError;
use crate::types::{ModeratorAction, Priority};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A moderator decision as received from the dashboard, before validation.
///
/// Every enum-valued field is still a raw string here; converting into
/// [`ModeratorDecision`] is the validation boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDraft {
    pub final_priority: String,
    #[serde(default)]
    pub final_category: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_notes: Option<String>,
    #[serde(default)]
    pub moderator_id: String,
}

/// A validated moderator decision for one content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ModeratorDecision {
    /// Priority the moderator settled on
    pub final_priority: Priority,
    /// Category the moderator settled on
    pub final_category: String,
    /// Action taken
    pub action: ModeratorAction,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderator_notes: Option<String>,
    /// Who decided
    pub moderator_id: String,
}

impl ModeratorDecision {
    /// Create a decision with no notes.
    pub fn new(
        final_priority: Priority,
        final_category: impl Into<String>,
        action: ModeratorAction,
        moderator_id: impl Into<String>,
    ) -> Self {
        Self {
            final_priority,
            final_category: final_category.into(),
            action,
            moderator_notes: None,
            moderator_id: moderator_id.into(),
        }
    }

    /// Attach moderator notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.moderator_notes = Some(notes.into());
        self
    }
}

impl TryFrom<DecisionDraft> for ModeratorDecision {
    type Error = TaxonomyError;

    fn try_from(draft: DecisionDraft) -> Result<Self, Self::Error> {
        let final_priority: Priority = draft.final_priority.parse()?;
        let action: ModeratorAction = draft.action.parse()?;

        let moderator_id = draft.moderator_id.trim();
        if moderator_id.is_empty() {
            return Err(TaxonomyError::MissingField("moderatorId"));
        }

        let decision = Self::new(
            final_priority,
            draft.final_category.trim(),
            action,
            moderator_id,
        );

        Ok(match draft.moderator_notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => decision.with_notes(notes),
            _ => decision,
        })
    }
}

/// How an AI priority compared with the moderator's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Same tier
    Correct,
    /// AI was too lenient
    UnderClassified,
    /// AI was too strict
    OverClassified,
}

impl Outcome {
    /// Score an AI priority against the human-corrected one by ordinal.
    pub fn between(ai: Priority, human: Priority) -> Self {
        match ai.ordinal().cmp(&human.ordinal()) {
            Ordering::Equal => Self::Correct,
            Ordering::Less => Self::UnderClassified,
            Ordering::Greater => Self::OverClassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::UnderClassified => "under_classified",
            Self::OverClassified => "over_classified",
        }
    }

    /// Phrase used when describing a misclassification in prose.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Correct => "classified correctly",
            Self::UnderClassified => "under-classified",
            Self::OverClassified => "over-classified",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(priority: &str, action: &str, moderator: &str) -> DecisionDraft {
        DecisionDraft {
            final_priority: priority.to_string(),
            final_category: " harassment ".to_string(),
            action: action.to_string(),
            moderator_notes: Some("  ".to_string()),
            moderator_id: moderator.to_string(),
        }
    }

    #[test]
    fn test_outcome_between() {
        assert_eq!(Outcome::between(Priority::High, Priority::High), Outcome::Correct);
        assert_eq!(
            Outcome::between(Priority::Medium, Priority::High),
            Outcome::UnderClassified
        );
        assert_eq!(
            Outcome::between(Priority::Critical, Priority::Low),
            Outcome::OverClassified
        );
    }

    #[test]
    fn test_outcome_all_pairs() {
        for ai in Priority::ALL {
            for human in Priority::ALL {
                let expected = if ai == human {
                    Outcome::Correct
                } else if human.ordinal() > ai.ordinal() {
                    Outcome::UnderClassified
                } else {
                    Outcome::OverClassified
                };
                assert_eq!(Outcome::between(ai, human), expected, "{ai} vs {human}");
            }
        }
    }

    #[test]
    fn test_draft_validation() {
        let decision = ModeratorDecision::try_from(draft("High", "hidden", "mod-7")).unwrap();
        assert_eq!(decision.final_priority, Priority::High);
        assert_eq!(decision.final_category, "harassment");
        assert_eq!(decision.action, ModeratorAction::Hidden);
        assert!(decision.moderator_notes.is_none());
    }

    #[test]
    fn test_draft_keeps_trimmed_notes() {
        let mut with_notes = draft("critical", "removed", "mod-7");
        with_notes.moderator_notes = Some(" asked for a phone number ".to_string());

        let decision = ModeratorDecision::try_from(with_notes).unwrap();
        assert_eq!(
            decision.moderator_notes.as_deref(),
            Some("asked for a phone number")
        );
    }

    #[test]
    fn test_draft_rejects_unknown_priority() {
        let err = ModeratorDecision::try_from(draft("severe", "hidden", "mod-7")).unwrap_err();
        assert_eq!(err, TaxonomyError::UnknownPriority("severe".to_string()));
    }

    #[test]
    fn test_draft_rejects_unknown_action_and_missing_moderator() {
        assert!(matches!(
            ModeratorDecision::try_from(draft("low", "deleted", "mod-7")),
            Err(TaxonomyError::UnknownAction(_))
        ));
        assert!(matches!(
            ModeratorDecision::try_from(draft("low", "approved", "  ")),
            Err(TaxonomyError::MissingField("moderatorId"))
        ));
    }

    #[test]
    fn test_decision_deserializes_camel_case() {
        let decision: ModeratorDecision = serde_json::from_str(
            r#"{"finalPriority":"critical","finalCategory":"privacy_violation","action":"removed","moderatorId":"m1"}"#,
        )
        .unwrap();
        assert_eq!(decision.final_priority, Priority::Critical);
        assert_eq!(decision.action, ModeratorAction::Removed);
    }
}
