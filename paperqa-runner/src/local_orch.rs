//! In-process implementation of layer0's Orchestrator protocol.

use async_trait::async_trait;
use layer0::{Agent, AgentId, OrchError, Orchestrator};
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatches a state value to one of a fixed set of registered agents,
/// keyed by [`AgentId`]. No durability, no retry — a turn that needs
/// those properties gets them from the caller (see `TurnRunner`), not
/// from the orchestrator itself.
pub struct LocalOrch<S: Send + 'static> {
    agents: HashMap<String, Arc<dyn Agent<S>>>,
}

impl<S: Send + 'static> LocalOrch<S> {
    /// Create a new, empty orchestrator.
    pub fn new() -> Self {
        Self { agents: HashMap::new() }
    }

    /// Register an agent under an id. Replaces any prior registration
    /// under the same id.
    pub fn register(&mut self, id: AgentId, agent: Arc<dyn Agent<S>>) {
        self.agents.insert(id.to_string(), agent);
    }
}

impl<S: Send + 'static> Default for LocalOrch<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S: Send + 'static> Orchestrator<S> for LocalOrch<S> {
    async fn dispatch(&self, agent: &AgentId, state: S) -> Result<S, OrchError> {
        let op = self.agents.get(agent.as_str()).ok_or_else(|| OrchError::AgentNotFound(agent.to_string()))?;
        op.execute(state).await.map_err(OrchError::Agent)
    }
}
