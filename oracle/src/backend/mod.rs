//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface over inference backends:
//! - OpenAI-compatible (OpenAI, vLLM, Ollama, etc.)
//! - Mock backend for testing

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::{MockBackend, MockReply};
pub use openai::OpenAiBackend;
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message,
    MessageRole, Usage,
};
