//! Shepherd Learning - moderation feedback loop
//!
//! Closes the loop between the classification oracle and human moderators:
//!
//! - **Learning classifier**: feeds recurring corrections back into the prompt
//! - **Pending predictions**: bounded, expiring cache of unsettled verdicts
//! - **Decision recorder**: scores AI priority against the moderator's
//! - **Training case store**: append-only history, optionally journaled
//! - **Feedback reporter**: accuracy, patterns and improvement suggestions
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   ModerationLearning                      │
//! │                                                           │
//! │  classify ──► LearningClassifier ──► ClassificationOracle │
//! │                    │       ▲                              │
//! │                    ▼       │ hints                        │
//! │          PendingPredictions  TrainingCaseStore ◄─ journal │
//! │                    │               ▲      │               │
//! │  record_decision ──► DecisionRecorder      ▼              │
//! │                                   FeedbackReporter        │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod classifier;
pub mod config;
pub mod journal;
pub mod pending;
pub mod recorder;
pub mod reporter;
pub mod service;
pub mod store;
pub mod types;

// Re-export main types
pub use classifier::LearningClassifier;
pub use config::LearningConfig;
pub use pending::{PendingPredictions, PendingStats};
pub use recorder::{DecisionRecorder, RecordStatus};
pub use reporter::FeedbackReporter;
pub use service::{LearningStats, ModerationLearning};
pub use store::TrainingCaseStore;
pub use types::*;
