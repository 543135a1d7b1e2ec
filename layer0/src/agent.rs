//! The Agent protocol — what one agent does per turn.

use crate::error::AgentError;
use async_trait::async_trait;

/// Protocol ① — The Agent
///
/// One named, single-responsibility stage that consumes and produces a
/// state value. Receives the current state, returns the updated state.
///
/// The trait is intentionally one method, generic over the state type
/// it operates on. Instantiated at `Agent<TurnState>` it stays
/// object-safe (`Arc<dyn Agent<TurnState>>`), while leaving room for a
/// different state shape in a different composition without forcing a
/// shared envelope type none of the implementations need.
#[async_trait]
pub trait Agent<S: Send + 'static>: Send + Sync {
    /// Execute one invocation of this agent.
    ///
    /// The agent receives the state by value and returns a new (or
    /// mutated) value. It MUST NOT retain references to the state
    /// after returning — ownership is fully transferred.
    async fn execute(&self, state: S) -> Result<S, AgentError>;
}
