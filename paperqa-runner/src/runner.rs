//! The Turn Runner (graph driver): dispatches agents in sequence for
//! one turn, enforces the safety bounds, and persists the session.

use layer0::{Agent, AgentId, Orchestrator, SessionId, StateError, TraceEvent, TraceSink};
use paperqa_agents::{AgentName, NextAgent, SessionRecord, TurnState};
use paperqa_state::SessionStore;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use thiserror::Error;

/// Hard upper bound on agent invocations within a single turn. Defense
/// in depth — the routing design never exceeds 3.
pub const MAX_AGENT_INVOCATIONS_PER_TURN: usize = 8;

const FIXED_ERROR_ANSWER: &str = "Something went wrong while processing your request. Please try again.";

/// Errors the Turn Runner itself can raise. An agent failure is not
/// one of these — it is absorbed into the turn's answer per the
/// fallback policy and never reaches the caller as an `Err`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The turn exceeded `MAX_AGENT_INVOCATIONS_PER_TURN` without
    /// reaching `NextAgent::End`.
    #[error("turn exceeded the {0}-invocation safety bound")]
    SafetyBound(usize),

    /// The session store failed in a way the runner could not absorb
    /// (the fallback answer itself needs a successful save to be
    /// durable; a save failure here is surfaced, not swallowed).
    #[error("session store error: {0}")]
    State(#[from] StateError),
}

/// Static configuration for [`TurnRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Overall wall-clock deadline for one turn.
    pub turn_deadline: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { turn_deadline: Duration::from_secs(120) }
    }
}

/// Final result of one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The text shown to the user.
    pub answer: String,
    /// Synthesis's confidence score, if Synthesis produced the answer.
    pub confidence: Option<f64>,
    /// The session this turn belonged to.
    pub session_id: SessionId,
}

/// The agent sequence and tool sequence observed during one turn, for
/// an external evaluator harness to assert against. This is the core's
/// sole contribution to the evaluator contract — judging answer
/// quality is an external LLM-as-judge concern the core never performs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRecord {
    /// Agents dispatched, in order, by name (e.g. "orchestrator").
    pub agents: Vec<String>,
    /// Distinct tools Research invoked, in first-use order.
    pub tools: Vec<String>,
}

fn next_agent_id(next: NextAgent) -> Option<AgentId> {
    match next {
        NextAgent::Orchestrator => Some(AgentId::new("orchestrator")),
        NextAgent::Clarification => Some(AgentId::new("clarification")),
        NextAgent::Research => Some(AgentId::new("research")),
        NextAgent::Synthesis => Some(AgentId::new("synthesis")),
        NextAgent::End => None,
    }
}

fn agent_name_for(next: NextAgent) -> Option<AgentName> {
    match next {
        NextAgent::Orchestrator => Some(AgentName::Orchestrator),
        NextAgent::Clarification => Some(AgentName::Clarification),
        NextAgent::Research => Some(AgentName::Research),
        NextAgent::Synthesis => Some(AgentName::Synthesis),
        NextAgent::End => None,
    }
}

/// Applies the §7 fallback: a fixed error answer, zero confidence, the
/// failed agent recorded as `last_agent`, the turn ended.
fn apply_fallback(mut state: TurnState, failed: NextAgent) -> TurnState {
    state.messages.push(paperqa_agents::Message::assistant(FIXED_ERROR_ANSWER));
    state.final_answer = Some(FIXED_ERROR_ANSWER.to_string());
    state.confidence = Some(0.0);
    state.next_agent = NextAgent::End;
    state.last_agent = agent_name_for(failed);
    state
}

/// Dispatches agents for one turn at a time, enforcing the invocation
/// cap and the overall turn deadline, and persisting the session
/// through a [`SessionStore`].
pub struct TurnRunner<B: layer0::StateStore> {
    orch: Box<dyn Orchestrator<TurnState>>,
    sessions: Arc<SessionStore<B>>,
    trace: Arc<dyn TraceSink>,
    config: RunnerConfig,
}

impl<B: layer0::StateStore> TurnRunner<B> {
    /// Build a runner over a fully-registered orchestrator and a
    /// session store backend.
    pub fn new(
        orch: Box<dyn Orchestrator<TurnState>>,
        sessions: Arc<SessionStore<B>>,
        trace: Arc<dyn TraceSink>,
        config: RunnerConfig,
    ) -> Self {
        Self { orch, sessions, trace, config }
    }

    /// Runs the dispatch loop. Returns `Ok` when the turn reached
    /// `NextAgent::End` or an agent failed (the fallback is already
    /// applied); returns `Err` with the last state reached when the
    /// invocation cap was hit without ending. `agents` accumulates the
    /// dispatch sequence for the evaluator trace record.
    async fn run_loop(
        &self,
        mut state: TurnState,
        in_flight: Arc<StdMutex<Option<NextAgent>>>,
        agents: &mut Vec<String>,
    ) -> Result<TurnState, TurnState> {
        for _ in 0..MAX_AGENT_INVOCATIONS_PER_TURN {
            if state.next_agent == NextAgent::End {
                return Ok(state);
            }

            let current = state.next_agent;
            *in_flight.lock().expect("in-flight mutex poisoned") = Some(current);
            let agent_id = next_agent_id(current).expect("NextAgent::End handled above");
            agents.push(agent_id.to_string());

            self.trace.record(TraceEvent::AgentEntered { agent: agent_id.to_string() }).await;

            match self.orch.dispatch(&agent_id, state).await {
                Ok(new_state) => {
                    self.trace
                        .record(TraceEvent::AgentExited {
                            agent: agent_id.to_string(),
                            next_agent: format!("{:?}", new_state.next_agent),
                        })
                        .await;
                    state = new_state;
                }
                Err(_err) => {
                    return Ok(apply_fallback(state, current));
                }
            }
        }
        Err(state)
    }

    /// Shared turn execution: load, dispatch until end or safety bound,
    /// persist, and return the final state plus its trace record.
    async fn run_turn_inner(
        &self,
        session_id: &SessionId,
        user_text: &str,
    ) -> Result<(TurnState, TraceRecord), RunnerError> {
        let _write_guard = self.sessions.lock_session(session_id).await;

        let record: SessionRecord = self.sessions.load(session_id).await?.unwrap_or_default();
        let initial = TurnState::new_turn(
            session_id.clone(),
            record.messages,
            record.last_agent,
            record.clarification_count,
            user_text,
        );

        self.trace.record(TraceEvent::TurnStarted { session_id: session_id.to_string() }).await;

        let in_flight: Arc<StdMutex<Option<NextAgent>>> = Arc::new(StdMutex::new(None));
        let pre_deadline = initial.clone();
        let mut agents = Vec::new();

        let (final_state, cap_hit) = match tokio::time::timeout(
            self.config.turn_deadline,
            self.run_loop(initial, in_flight.clone(), &mut agents),
        )
        .await
        {
            Ok(Ok(state)) => (state, false),
            Ok(Err(state)) => (state, true),
            Err(_elapsed) => {
                let failed = in_flight.lock().expect("in-flight mutex poisoned").unwrap_or(NextAgent::Orchestrator);
                (apply_fallback(pre_deadline, failed), false)
            }
        };

        self.trace
            .record(TraceEvent::TurnEnded {
                final_answer_len: final_state.final_answer.as_deref().map(str::len).unwrap_or(0),
                confidence: final_state.confidence,
            })
            .await;

        let record = SessionRecord {
            messages: final_state.messages.clone(),
            last_agent: final_state.last_agent,
            clarification_count: final_state.clarification_count,
        };
        self.sessions.save(session_id, &record).await?;

        if cap_hit {
            return Err(RunnerError::SafetyBound(MAX_AGENT_INVOCATIONS_PER_TURN));
        }

        let trace = TraceRecord { agents, tools: final_state.context.tool_history.clone() };
        Ok((final_state, trace))
    }

    /// Run one turn to completion: load the session, dispatch agents
    /// until the turn ends (or a safety bound is hit), persist the
    /// updated session, and return the answer.
    pub async fn run_turn(&self, session_id: &SessionId, user_text: &str) -> Result<TurnOutcome, RunnerError> {
        let (final_state, _trace) = self.run_turn_inner(session_id, user_text).await?;
        Ok(TurnOutcome {
            answer: final_state.final_answer.unwrap_or_default(),
            confidence: final_state.confidence,
            session_id: session_id.clone(),
        })
    }

    /// Run one turn exactly as [`TurnRunner::run_turn`] does, additionally
    /// returning the agent/tool trace record an evaluator harness needs
    /// to assert `ScenarioAssertion`s against.
    pub async fn run_turn_traced(
        &self,
        session_id: &SessionId,
        user_text: &str,
    ) -> Result<(TurnOutcome, TraceRecord), RunnerError> {
        let (final_state, trace) = self.run_turn_inner(session_id, user_text).await?;
        let outcome = TurnOutcome {
            answer: final_state.final_answer.unwrap_or_default(),
            confidence: final_state.confidence,
            session_id: session_id.clone(),
        };
        Ok((outcome, trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_orch::LocalOrch;
    use async_trait::async_trait;
    use layer0::{AgentError, VecSink};
    use paperqa_state::MemoryStore;

    struct AlwaysEnd;

    #[async_trait]
    impl Agent<TurnState> for AlwaysEnd {
        async fn execute(&self, mut state: TurnState) -> Result<TurnState, AgentError> {
            state.final_answer = Some("done".to_string());
            state.confidence = Some(0.8);
            state.next_agent = NextAgent::End;
            state.last_agent = Some(AgentName::Synthesis);
            Ok(state)
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl Agent<TurnState> for AlwaysFail {
        async fn execute(&self, _state: TurnState) -> Result<TurnState, AgentError> {
            Err(AgentError::NonRetryable("boom".into()))
        }
    }

    struct AlwaysLoop;

    #[async_trait]
    impl Agent<TurnState> for AlwaysLoop {
        async fn execute(&self, state: TurnState) -> Result<TurnState, AgentError> {
            Ok(state)
        }
    }

    fn runner_over(orch: LocalOrch<TurnState>) -> TurnRunner<MemoryStore> {
        TurnRunner::new(
            Box::new(orch),
            Arc::new(SessionStore::new(MemoryStore::new())),
            Arc::new(VecSink::new()),
            RunnerConfig::default(),
        )
    }

    #[tokio::test]
    async fn happy_path_persists_and_returns_answer() {
        let mut orch: LocalOrch<TurnState> = LocalOrch::new();
        orch.register(AgentId::new("orchestrator"), Arc::new(AlwaysEnd));
        let runner = runner_over(orch);

        let session_id = SessionId::new("s1");
        let outcome = runner.run_turn(&session_id, "hello").await.unwrap();
        assert_eq!(outcome.answer, "done");
        assert_eq!(outcome.confidence, Some(0.8));
    }

    #[tokio::test]
    async fn agent_failure_produces_fixed_fallback_and_persists_session() {
        let mut orch: LocalOrch<TurnState> = LocalOrch::new();
        orch.register(AgentId::new("orchestrator"), Arc::new(AlwaysFail));
        let runner = runner_over(orch);

        let session_id = SessionId::new("s2");
        let outcome = runner.run_turn(&session_id, "hello").await.unwrap();
        assert_eq!(outcome.answer, FIXED_ERROR_ANSWER);
        assert_eq!(outcome.confidence, Some(0.0));

        let record: SessionRecord = runner.sessions.load(&session_id).await.unwrap().unwrap();
        assert_eq!(record.last_agent, Some(AgentName::Orchestrator));
    }

    #[tokio::test]
    async fn invocation_cap_surfaces_safety_bound_error() {
        let mut orch: LocalOrch<TurnState> = LocalOrch::new();
        orch.register(AgentId::new("orchestrator"), Arc::new(AlwaysLoop));
        let runner = runner_over(orch);

        let session_id = SessionId::new("s3");
        let err = runner.run_turn(&session_id, "hello").await.unwrap_err();
        assert!(matches!(err, RunnerError::SafetyBound(MAX_AGENT_INVOCATIONS_PER_TURN)));
    }

    #[tokio::test]
    async fn run_turn_traced_reports_agent_sequence() {
        let mut orch: LocalOrch<TurnState> = LocalOrch::new();
        orch.register(AgentId::new("orchestrator"), Arc::new(AlwaysEnd));
        let runner = runner_over(orch);

        let session_id = SessionId::new("s4");
        let (outcome, trace) = runner.run_turn_traced(&session_id, "hello").await.unwrap();
        assert_eq!(outcome.answer, "done");
        assert_eq!(trace.agents, vec!["orchestrator".to_string()]);
        assert!(trace.tools.is_empty());
    }
}
