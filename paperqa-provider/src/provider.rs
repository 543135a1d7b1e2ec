//! The LLM gateway interface.
//!
//! [`Provider`] uses RPITIT (return-position `impl Trait` in traits)
//! and is intentionally NOT object-safe — callers are generic over a
//! concrete `P: Provider`, matching how the agents that use it
//! (`OrchestratorAgent<P>`, `ClarificationAgent<P>`, `ResearchAgent<P>`,
//! `SynthesisAgent<P>`) are monomorphized over one provider type rather
//! than boxed.

use crate::types::{ProviderRequest, ProviderResponse};
use std::future::Future;
use thiserror::Error;

/// Errors from the LLM gateway.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The gateway rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Could not parse the gateway's response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::RequestFailed(_))
    }
}

/// One chat-completion operation: `complete(messages, model, temperature,
/// tools) -> text and/or tool-call intents`, per the spec's LLM gateway
/// interface.
pub trait Provider: Send + Sync {
    /// Send one completion request to the gateway.
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}
