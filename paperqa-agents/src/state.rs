//! `TurnState`: the object passed between agents within one turn.

use crate::message::Message;
use layer0::SessionId;
use serde::{Deserialize, Serialize};

/// Which agent most recently executed in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    /// The Orchestrator agent.
    Orchestrator,
    /// The Clarification agent.
    Clarification,
    /// The Research agent.
    Research,
    /// The Synthesis agent.
    Synthesis,
}

/// Which agent the graph driver should dispatch to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAgent {
    /// Dispatch to Orchestrator.
    Orchestrator,
    /// Dispatch to Clarification.
    Clarification,
    /// Dispatch to Research.
    Research,
    /// Dispatch to Synthesis.
    Synthesis,
    /// The turn is over.
    End,
}

/// Research's findings, consumed by Synthesis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Unique tool names, in first-use order.
    pub tool_history: Vec<String>,
    /// One string per unique tool invoked ("Used tool: <name>"), or a
    /// failure description on a fatal loop error.
    pub observations: Vec<String>,
    /// Research's final assistant text.
    pub final_output: String,
}

/// The object passed between agents within one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    /// Unique conversation identifier.
    pub session_id: SessionId,
    /// Entire history for this session up to and including the current
    /// user turn.
    pub messages: Vec<Message>,
    /// Drives the graph driver.
    pub next_agent: NextAgent,
    /// Which agent most recently executed in this session.
    pub last_agent: Option<AgentName>,
    /// Consecutive clarifications in this session; reset to 0 when
    /// Research runs.
    pub clarification_count: u32,
    /// Fields populated by Research, consumed by Synthesis.
    pub context: Context,
    /// Set by Clarification or Synthesis.
    pub final_answer: Option<String>,
    /// Set by Synthesis.
    pub confidence: Option<f64>,
    /// Incremented once per agent execution (diagnostic).
    pub iteration: u32,
}

impl TurnState {
    /// Build the initial state for a new turn: stored history plus the
    /// newly appended user message, routed to Orchestrator.
    pub fn new_turn(
        session_id: SessionId,
        mut messages: Vec<Message>,
        last_agent: Option<AgentName>,
        clarification_count: u32,
        user_text: impl Into<String>,
    ) -> Self {
        messages.push(Message::user(user_text));
        Self {
            session_id,
            messages,
            next_agent: NextAgent::Orchestrator,
            last_agent,
            clarification_count,
            context: Context::default(),
            final_answer: None,
            confidence: None,
            iteration: 0,
        }
    }

    /// The last two messages, if exactly (assistant, user) in that order.
    pub fn last_two_are_assistant_then_user(&self) -> bool {
        let len = self.messages.len();
        if len < 2 {
            return false;
        }
        self.messages[len - 2].kind == crate::message::MessageKind::Assistant
            && self.messages[len - 1].kind == crate::message::MessageKind::User
    }

    /// The most recent user message, if any.
    pub fn latest_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.kind == crate::message::MessageKind::User)
    }

    /// The tail of `messages`, at most `max_history` entries.
    pub fn history_tail(&self, max_history: usize) -> &[Message] {
        let len = self.messages.len();
        let start = len.saturating_sub(max_history);
        &self.messages[start..]
    }
}

/// The portion of `TurnState` that survives across turns in the Session
/// Store: `messages`, `last_agent`, `clarification_count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Stored conversation history.
    pub messages: Vec<Message>,
    /// Which agent last executed in this session.
    pub last_agent: Option<AgentName>,
    /// Consecutive clarifications so far.
    pub clarification_count: u32,
}
