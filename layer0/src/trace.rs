//! The Trace interface — structured observation, no intervention.
//!
//! Unlike a hook pipeline that can halt or rewrite execution, a
//! [`TraceSink`] is purely an observer: the runner and agents call it
//! at defined points and it cannot change what happens next. This
//! matches the evaluator contract, which only needs to reconstruct the
//! agent sequence and tool-invocation sequence for a turn — it never
//! needs to steer the turn itself.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

/// A structured event emitted at a defined point during a turn.
///
/// Mirrors the trace events required by the evaluator contract:
/// `turn_started`, `agent_entered`, `agent_exited`, `tool_invoked`,
/// `tool_returned`, `turn_ended`.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum TraceEvent {
    /// A turn began for the given session.
    TurnStarted {
        /// The session the turn belongs to.
        session_id: String,
    },
    /// An agent was entered.
    AgentEntered {
        /// Name of the agent entered (e.g. "orchestrator").
        agent: String,
    },
    /// An agent finished and chose the next agent.
    AgentExited {
        /// Name of the agent that exited.
        agent: String,
        /// The agent's routing decision.
        next_agent: String,
    },
    /// A tool was invoked.
    ToolInvoked {
        /// Name of the tool invoked.
        tool: String,
        /// A short, non-sensitive summary of the arguments.
        args_summary: String,
    },
    /// A tool call returned.
    ToolReturned {
        /// Name of the tool that returned.
        tool: String,
        /// Whether the call succeeded.
        ok: bool,
    },
    /// A turn ended.
    TurnEnded {
        /// Length of the final answer text.
        final_answer_len: usize,
        /// Confidence, if one was produced.
        confidence: Option<f64>,
    },
}

/// An observer of [`TraceEvent`]s. Implementations must not block the
/// caller for long or fail loudly — a slow or failing trace sink must
/// never be allowed to affect turn outcomes.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// Record one trace event.
    async fn record(&self, event: TraceEvent);
}

/// A sink that discards every event. Useful as a default when no
/// evaluator/observability backend is wired up.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl TraceSink for NullSink {
    async fn record(&self, _event: TraceEvent) {}
}

/// A sink that records events into an in-memory vector, for tests that
/// want to assert on the agent/tool sequence a turn produced.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl VecSink {
    /// Create a new, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the events recorded so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("VecSink mutex poisoned").clone()
    }
}

#[async_trait]
impl TraceSink for VecSink {
    async fn record(&self, event: TraceEvent) {
        self.events.lock().expect("VecSink mutex poisoned").push(event);
    }
}

/// A sink that forwards every event to `tracing::info!` with structured
/// fields, for deployments that already ship a `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TraceSink for TracingSink {
    async fn record(&self, event: TraceEvent) {
        match event {
            TraceEvent::TurnStarted { session_id } => {
                info!(session_id, "turn_started");
            }
            TraceEvent::AgentEntered { agent } => {
                info!(agent, "agent_entered");
            }
            TraceEvent::AgentExited { agent, next_agent } => {
                info!(agent, next_agent, "agent_exited");
            }
            TraceEvent::ToolInvoked { tool, args_summary } => {
                info!(tool, args_summary, "tool_invoked");
            }
            TraceEvent::ToolReturned { tool, ok } => {
                info!(tool, ok, "tool_returned");
            }
            TraceEvent::TurnEnded { final_answer_len, confidence } => {
                info!(final_answer_len, confidence, "turn_ended");
            }
        }
    }
}
