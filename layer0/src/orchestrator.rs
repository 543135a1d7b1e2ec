//! The Orchestrator protocol — how the runner dispatches to a named agent.

use crate::error::OrchError;
use crate::id::AgentId;
use async_trait::async_trait;

/// Protocol ② — Orchestration
///
/// Dispatches one state value to a named agent and returns its result.
/// The trait doesn't say how dispatch happens — in-process function
/// call, a queue, a remote call — only that it is keyed by [`AgentId`].
///
/// Implementations:
/// - `LocalOrch` (crate `paperqa-runner`): `HashMap<AgentId, Arc<dyn Agent<S>>>`,
///   in-process, no durability.
#[async_trait]
pub trait Orchestrator<S: Send + 'static>: Send + Sync {
    /// Dispatch a state value to the named agent and return its result.
    async fn dispatch(&self, agent: &AgentId, state: S) -> Result<S, OrchError>;
}
