//! Audit trail for oracle calls.
//!
//! Every classification attempt is logged with its latency and whether the
//! reply was usable, so the dashboard can show how often moderators are
//! working without an AI suggestion.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use shepherd_taxonomy::Priority;

/// Maximum entries in the audit log before pruning.
pub const MAX_AUDIT_ENTRIES: usize = 10_000;

/// How an oracle call ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallResult {
    /// Reply parsed into a classification
    Classified { priority: Priority },
    /// Fallback classification was returned instead
    Fallback { reason: String },
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleCall {
    /// Unique call ID
    pub call_id: String,
    /// Backend model that was asked
    pub model: String,
    /// Advisory content type sent with the request
    pub content_type: String,
    /// How the call ended
    pub result: CallResult,
    /// Wall-clock time spent, including timeout waits
    pub latency_ms: u64,
    /// When the call finished
    pub at: DateTime<Utc>,
}

impl OracleCall {
    pub fn new(model: &str, content_type: &str, result: CallResult, latency_ms: u64) -> Self {
        Self {
            call_id: uuid::Uuid::new_v4().to_string(),
            model: model.to_string(),
            content_type: content_type.to_string(),
            result,
            latency_ms,
            at: Utc::now(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.result, CallResult::Fallback { .. })
    }
}

/// Bounded log of oracle calls (newest first).
pub struct OracleAudit {
    entries: RwLock<VecDeque<OracleCall>>,
    max_entries: usize,
}

impl OracleAudit {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self::with_max_entries(MAX_AUDIT_ENTRIES)
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a finished call.
    pub async fn record(&self, call: OracleCall) {
        let mut entries = self.entries.write().await;
        entries.push_front(call);

        while entries.len() > self.max_entries {
            entries.pop_back();
        }
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<OracleCall> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Get statistics over retained entries.
    pub async fn stats(&self) -> OracleStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let fallbacks = entries.iter().filter(|e| e.is_fallback()).count();
        let avg_latency_ms = if total > 0 {
            entries.iter().map(|e| e.latency_ms).sum::<u64>() / total as u64
        } else {
            0
        };

        OracleStats {
            total_calls: total,
            fallbacks,
            fallback_rate: if total > 0 {
                fallbacks as f64 / total as f64
            } else {
                0.0
            },
            avg_latency_ms,
        }
    }
}

impl Default for OracleAudit {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleStats {
    pub total_calls: usize,
    pub fallbacks: usize,
    pub fallback_rate: f64,
    pub avg_latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_audit_stats() {
        let audit = OracleAudit::new();

        audit
            .record(OracleCall::new(
                "m",
                "comment",
                CallResult::Classified {
                    priority: Priority::Low,
                },
                100,
            ))
            .await;
        audit
            .record(OracleCall::new(
                "m",
                "comment",
                CallResult::Fallback {
                    reason: "timeout".to_string(),
                },
                300,
            ))
            .await;

        let stats = audit.stats().await;
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.fallbacks, 1);
        assert_eq!(stats.fallback_rate, 0.5);
        assert_eq!(stats.avg_latency_ms, 200);

        let recent = audit.recent(1).await;
        assert!(recent[0].is_fallback());
    }

    #[tokio::test]
    async fn test_audit_prunes_oldest() {
        let audit = OracleAudit::with_max_entries(3);
        for latency in 0..5 {
            audit
                .record(OracleCall::new(
                    "m",
                    "discussion",
                    CallResult::Classified {
                        priority: Priority::Medium,
                    },
                    latency,
                ))
                .await;
        }

        assert_eq!(audit.count().await, 3);
        let recent = audit.recent(10).await;
        assert_eq!(recent[0].latency_ms, 4);
        assert_eq!(recent[2].latency_ms, 2);
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let stats = OracleAudit::new().stats().await;
        assert_eq!(stats.total_calls, 0);
        assert_eq!(stats.fallback_rate, 0.0);
    }
}
