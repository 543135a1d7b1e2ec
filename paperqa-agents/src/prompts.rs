//! Prompt template names and the formatting helpers shared by agents.

use crate::message::{Message, MessageKind};

/// Template name for the Orchestrator agent.
pub const AGENT_ORCHESTRATOR: &str = "agent_orchestrator";
/// Template name for the Clarification agent.
pub const AGENT_CLARIFICATION: &str = "agent_clarification";
/// Template name for the Research agent.
pub const AGENT_RESEARCH: &str = "agent_research";
/// Template name for the Synthesis agent.
pub const AGENT_SYNTHESIS: &str = "agent_synthesis";

/// Format a history tail as alternating `"User: …"` / `"AI: …"` lines.
pub fn format_history(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.kind == MessageKind::User || m.kind == MessageKind::Assistant)
        .map(|m| match m.kind {
            MessageKind::User => format!("User: {}", m.text),
            _ => format!("AI: {}", m.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
