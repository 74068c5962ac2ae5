//! Error types for the gateway.

use shepherd_learning::LearningError;
use shepherd_oracle::LlmError;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Socket error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM backend could not be built
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Learning subsystem could not start
    #[error("Learning error: {0}")]
    Learning(#[from] LearningError),
}

/// Result type for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;
