//! Core moderation vocabulary.
//!
//! These types describe how a piece of community content is judged: the
//! ordered priority tiers, the advisory actions, and the classification an
//! oracle produces.
//!
//! With the `typescript` feature enabled, these types can be exported to
//! TypeScript using ts-rs for consistency with the moderation dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TaxonomyError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Priority tier of a piece of content.
///
/// Ordered by severity; `Critical` is maximal. The ordinal drives outcome
/// scoring, so the discriminants are part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Ordinary content, nothing to review
    Low = 1,
    /// Worth a moderator glance
    Medium = 2,
    /// Should be hidden pending review
    High = 3,
    /// Must be removed immediately
    Critical = 4,
}

impl Priority {
    /// All tiers, least severe first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Severity ordinal (low=1 .. critical=4).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Wire/prompt representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse oracle output, clamping anything unrecognized to `Medium`.
    ///
    /// Use [`FromStr`] at validation boundaries instead; this is only for
    /// untrusted model output where a safe default beats an error.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or(Self::Medium)
    }

    /// Advisory action implied by this tier when the oracle gives none.
    pub fn default_action(&self) -> RecommendedAction {
        match self {
            Self::Low => RecommendedAction::Approve,
            Self::Medium => RecommendedAction::Review,
            Self::High => RecommendedAction::Hide,
            Self::Critical => RecommendedAction::Remove,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(TaxonomyError::UnknownPriority(s.to_string())),
        }
    }
}

/// Kind of community content being classified.
///
/// The oracle treats content type as advisory context only, so callers may
/// still pass strings outside this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Discussion,
    Comment,
    SoapEntry,
    PrayerRequest,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discussion => "discussion",
            Self::Comment => "comment",
            Self::SoapEntry => "soap_entry",
            Self::PrayerRequest => "prayer_request",
        }
    }

    /// Human description used in prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Discussion => "a discussion post in the community feed",
            Self::Comment => "a comment replying to another member",
            Self::SoapEntry => {
                "a SOAP journal entry (Scripture, Observation, Application, Prayer)"
            }
            Self::PrayerRequest => "a prayer request shared with the congregation",
        }
    }

    /// Describe an arbitrary content type string, falling back to the raw value.
    pub fn describe_raw(content_type: &str) -> String {
        match content_type.parse::<ContentType>() {
            Ok(known) => known.describe().to_string(),
            Err(_) if content_type.trim().is_empty() => "community content".to_string(),
            Err(_) => format!("community content of type '{}'", content_type.trim()),
        }
    }
}

impl FromStr for ContentType {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discussion" => Ok(Self::Discussion),
            "comment" => Ok(Self::Comment),
            "soap_entry" | "soap" => Ok(Self::SoapEntry),
            "prayer_request" | "prayer" => Ok(Self::PrayerRequest),
            _ => Err(TaxonomyError::UnknownContentType(s.to_string())),
        }
    }
}

/// Action the oracle recommends. Advisory; nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Approve,
    Hide,
    Remove,
    EditRequested,
    Review,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Hide => "hide",
            Self::Remove => "remove",
            Self::EditRequested => "edit_requested",
            Self::Review => "review",
        }
    }
}

impl FromStr for RecommendedAction {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "hide" => Ok(Self::Hide),
            "remove" => Ok(Self::Remove),
            "edit_requested" | "request_edit" => Ok(Self::EditRequested),
            "review" => Ok(Self::Review),
            _ => Err(TaxonomyError::UnknownAction(s.to_string())),
        }
    }
}

/// Final action a moderator took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ModeratorAction {
    Approved,
    Hidden,
    Removed,
    EditRequested,
}

impl ModeratorAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Hidden => "hidden",
            Self::Removed => "removed",
            Self::EditRequested => "edit_requested",
        }
    }
}

impl FromStr for ModeratorAction {
    type Err = TaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "hidden" => Ok(Self::Hidden),
            "removed" => Ok(Self::Removed),
            "edit_requested" => Ok(Self::EditRequested),
            _ => Err(TaxonomyError::UnknownAction(s.to_string())),
        }
    }
}

/// Reason attached to the conservative fallback classification.
pub const FALLBACK_REASON: &str = "classification unavailable";

/// Category attached to the conservative fallback classification.
pub const FALLBACK_CATEGORY: &str = "unclassified";

/// An oracle's verdict on a piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Severity tier
    pub priority: Priority,
    /// Short free-form label, e.g. `privacy_violation`
    pub category: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Advisory moderation action
    pub action_required: RecommendedAction,
    /// Human-readable rationale
    pub reason: String,
}

impl Classification {
    /// Create a classification, clamping confidence into [0, 1].
    pub fn new(
        priority: Priority,
        category: impl Into<String>,
        confidence: f32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            category: category.into(),
            confidence: clamp_confidence(confidence),
            action_required: priority.default_action(),
            reason: reason.into(),
        }
    }

    /// Override the advisory action.
    pub fn with_action(mut self, action: RecommendedAction) -> Self {
        self.action_required = action;
        self
    }

    /// Conservative verdict used whenever the oracle cannot answer.
    pub fn fallback() -> Self {
        Self {
            priority: Priority::Medium,
            category: FALLBACK_CATEGORY.to_string(),
            confidence: 0.0,
            action_required: RecommendedAction::Review,
            reason: FALLBACK_REASON.to_string(),
        }
    }

    /// Whether this is the fallback verdict rather than a real classification.
    pub fn is_fallback(&self) -> bool {
        self.confidence == 0.0 && self.reason == FALLBACK_REASON
    }
}

/// Lowercase snake_case form of a category label.
///
/// Categories are open strings, so both oracle output and moderator input
/// are normalized before they are compared or grouped.
pub fn normalize_category(category: &str) -> String {
    category
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Clamp a model-reported confidence into [0, 1]; NaN becomes 0.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
