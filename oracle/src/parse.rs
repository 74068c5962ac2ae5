//! Parsing oracle replies into classifications.
//!
//! Models rarely return exactly the JSON they were asked for: replies come
//! wrapped in markdown fences, prefixed with prose, or with fields renamed.
//! Parsing is lenient about the envelope and strict about the fields the
//! outcome scoring depends on.

use serde_json::Value;
use tracing::warn;

use shepherd_taxonomy::{
    clamp_confidence, normalize_category, Classification, Priority, RecommendedAction,
};

/// Why a reply could not be turned into a classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// No `{ ... }` object anywhere in the reply
    #[error("No JSON object in oracle reply")]
    NoJsonObject,

    /// Found braces but the contents were not valid JSON
    #[error("Invalid JSON in oracle reply: {0}")]
    InvalidJson(String),

    /// A required field was absent or empty
    #[error("Oracle reply missing required field: {0}")]
    MissingField(&'static str),
}

/// Parse a raw oracle reply.
///
/// `priority` and `category` are required. An unrecognized priority is
/// clamped to `medium`; confidence is clamped into [0, 1]; a missing or
/// unknown action is derived from the priority.
pub fn parse_classification(raw: &str) -> Result<Classification, ParseError> {
    let data = extract_json_object(raw)?;

    let raw_priority = string_field(&data, &["priority", "severity"])
        .ok_or(ParseError::MissingField("priority"))?;
    let priority = match raw_priority.parse::<Priority>() {
        Ok(priority) => priority,
        Err(_) => {
            warn!(priority = %raw_priority, "Oracle returned unknown priority, clamping to medium");
            Priority::Medium
        }
    };

    let category = string_field(&data, &["category", "label"])
        .map(|c| normalize_category(&c))
        .filter(|c| !c.is_empty())
        .ok_or(ParseError::MissingField("category"))?;

    let confidence = data
        .get("confidence")
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .map(|c| clamp_confidence(c as f32))
        .unwrap_or(0.0);

    let action = string_field(&data, &["action_required", "actionRequired", "action"])
        .and_then(|a| a.parse::<RecommendedAction>().ok())
        .unwrap_or_else(|| priority.default_action());

    let reason = string_field(&data, &["reason", "rationale", "explanation"]).unwrap_or_default();

    Ok(Classification::new(priority, category, confidence, reason).with_action(action))
}

/// Locate and decode the outermost JSON object in a reply.
pub fn extract_json_object(raw: &str) -> Result<Value, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    let value: Value = serde_json::from_str(&raw[start..=end])
        .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(ParseError::InvalidJson("top-level value is not an object".to_string()))
    }
}

/// First non-empty string among the given keys.
fn string_field(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}
