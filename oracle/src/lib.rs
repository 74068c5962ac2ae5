//! Shepherd Oracle - LLM-backed content classification
//!
//! Wraps an external large-language-model service as a content-safety
//! classifier for the community feed:
//! - Trait-based LLM backends (OpenAI-compatible, mock)
//! - Lenient reply parsing with strict priority handling
//! - Conservative fallback whenever the model cannot answer
//! - Audit trail of every call
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         ClassificationOracle            │
//! │  (prompt → complete → parse/fallback)   │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │ OracleAudit │
//! │ (OpenAI/    │       │             │
//! │  Mock)      │       │             │
//! └─────────────┘       └─────────────┘
//! ```

pub mod audit;
pub mod backend;
pub mod oracle;
pub mod parse;

// Re-export main types for convenience
pub use audit::{CallResult, OracleAudit, OracleCall, OracleStats};
pub use backend::traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
pub use backend::{MockBackend, MockReply, OpenAiBackend};
pub use oracle::{ClassificationOracle, OracleConfig, OracleError};
pub use parse::{parse_classification, ParseError};
