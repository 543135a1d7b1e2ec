//! Error types for each protocol boundary.

use thiserror::Error;

/// Errors an [`crate::Agent`] implementation can return.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgentError {
    /// An error from the model/LLM provider.
    #[error("model error: {0}")]
    Model(String),

    /// An error during tool execution that the agent could not absorb
    /// into a textual observation.
    #[error("tool error in {tool}: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Error message.
        message: String,
    },

    /// The agent failed but retrying might succeed.
    #[error("retryable: {0}")]
    Retryable(String),

    /// The agent failed and retrying won't help.
    #[error("non-retryable: {0}")]
    NonRetryable(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Orchestration errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchError {
    /// The requested agent was not registered.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// An agent error propagated through dispatch.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// State store errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StateError {
    /// A write operation failed.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
