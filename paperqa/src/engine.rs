//! `PaperQaEngine`: the transport-agnostic facade over the turn runner.

use crate::config::EngineConfig;
use layer0::{Agent, AgentId, SessionId, StateStore, TraceSink};
use paperqa_agents::{
    ClarificationAgent, Message, MessageKind, OrchestratorAgent, PdfRetrievalTool, ResearchAgent, SessionRecord, SynthesisAgent,
    TurnState, WebSearchTool,
};
use paperqa_provider::{PromptService, Provider, VectorSearch, WebSearch};
use paperqa_runner::{LocalOrch, RunnerConfig, RunnerError, TraceRecord, TurnRunner};
use paperqa_state::SessionStore;
use paperqa_tool::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// One turn in a session's history, as returned by [`PaperQaEngine::get_history`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HistoryEntry {
    /// `"user"`, `"assistant"`, `"tool_call"`, or `"tool_result"`.
    pub role: String,
    /// The message text (or, for tool entries, a short description).
    pub content: String,
}

/// The answer to one `chat` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// The text shown to the user.
    pub answer: String,
    /// The session this turn belongs to (generated if the caller didn't supply one).
    pub session_id: String,
    /// Synthesis's confidence score, if one was produced.
    pub confidence: Option<f64>,
}

/// Errors a caller of [`PaperQaEngine`] can observe. Distinct from
/// [`RunnerError`] only in the one case the facade itself can't absorb
/// into a well-formed answer: the invocation safety bound.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// The turn exceeded the hard agent-invocation safety bound.
    #[error(transparent)]
    Runner(#[from] RunnerError),
}

fn to_history_entry(message: &Message) -> HistoryEntry {
    let role = match message.kind {
        MessageKind::User => "user",
        MessageKind::Assistant => "assistant",
        MessageKind::ToolCall => "tool_call",
        MessageKind::ToolResult => "tool_result",
    };
    HistoryEntry { role: role.to_string(), content: message.text.clone() }
}

/// The facade: `chat`, `get_history`, `clear_history`. Transport-agnostic
/// — no HTTP types appear anywhere in this crate.
pub struct PaperQaEngine<B: StateStore> {
    runner: TurnRunner<B>,
    sessions: Arc<SessionStore<B>>,
}

impl<B: StateStore> PaperQaEngine<B> {
    /// Build an engine from four already-wired agents and a state
    /// backend. This is the low-level constructor; see [`build_engine`]
    /// for the common case of wiring all four agents against a single
    /// provider and prompt service pair.
    pub fn new(
        orchestrator: Arc<dyn Agent<TurnState>>,
        clarification: Arc<dyn Agent<TurnState>>,
        research: Arc<dyn Agent<TurnState>>,
        synthesis: Arc<dyn Agent<TurnState>>,
        backend: B,
        trace: Arc<dyn TraceSink>,
        runner_config: RunnerConfig,
        session_ttl: Duration,
    ) -> Self {
        let mut orch: LocalOrch<TurnState> = LocalOrch::new();
        orch.register(AgentId::new("orchestrator"), orchestrator);
        orch.register(AgentId::new("clarification"), clarification);
        orch.register(AgentId::new("research"), research);
        orch.register(AgentId::new("synthesis"), synthesis);

        let sessions = Arc::new(SessionStore::with_ttl(backend, session_ttl));
        let runner = TurnRunner::new(Box::new(orch), sessions.clone(), trace, runner_config);
        Self { runner, sessions }
    }

    /// Run one turn. Generates a new session id if none is supplied.
    /// Always returns a well-formed answer object unless the turn hit
    /// the hard invocation safety bound.
    pub async fn chat(&self, user_text: &str, session_id: Option<String>) -> Result<ChatResponse, EngineError> {
        let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let id = SessionId::new(session_id.clone());
        let outcome = self.runner.run_turn(&id, user_text).await?;
        Ok(ChatResponse { answer: outcome.answer, session_id, confidence: outcome.confidence })
    }

    /// Run one turn exactly as [`PaperQaEngine::chat`] does, additionally
    /// returning the agent/tool trace record an evaluator harness needs.
    pub async fn chat_traced(
        &self,
        user_text: &str,
        session_id: Option<String>,
    ) -> Result<(ChatResponse, TraceRecord), EngineError> {
        let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let id = SessionId::new(session_id.clone());
        let (outcome, trace) = self.runner.run_turn_traced(&id, user_text).await?;
        let response = ChatResponse { answer: outcome.answer, session_id, confidence: outcome.confidence };
        Ok((response, trace))
    }

    /// Fetch the stored history for a session. Empty if the session
    /// doesn't exist.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>, EngineError> {
        let id = SessionId::new(session_id.to_string());
        let record: Option<SessionRecord> = self.sessions.load(&id).await.map_err(RunnerError::State)?;
        Ok(record.map(|r| r.messages.iter().map(to_history_entry).collect()).unwrap_or_default())
    }

    /// Clear a session's stored history.
    pub async fn clear_history(&self, session_id: &str) -> Result<(), EngineError> {
        let id = SessionId::new(session_id.to_string());
        self.sessions.clear(&id).await.map_err(RunnerError::State)?;
        Ok(())
    }
}

/// Wire all four agents against one cloneable `Provider` + `PromptService`
/// pair and a shared tool set, per [`EngineConfig`]. The common-case
/// constructor for an Anthropic-backed deployment; anything more bespoke
/// should call [`PaperQaEngine::new`] directly.
#[allow(clippy::too_many_arguments)]
pub fn build_engine<B, P, T, S, W>(
    provider: P,
    prompts: T,
    vector_search: Arc<S>,
    web_search: Arc<W>,
    backend: B,
    trace: Arc<dyn TraceSink>,
    config: EngineConfig,
) -> PaperQaEngine<B>
where
    B: StateStore,
    P: Provider + Clone + Send + Sync + 'static,
    T: PromptService + Clone + 'static,
    S: VectorSearch + Send + Sync + 'static,
    W: WebSearch + Send + Sync + 'static,
{
    let orchestrator = Arc::new(OrchestratorAgent::new(provider.clone(), prompts.clone(), config.orchestrator));
    let clarification = Arc::new(ClarificationAgent::new(provider.clone(), prompts.clone(), config.clarification));
    let synthesis = Arc::new(SynthesisAgent::new(provider.clone(), prompts.clone(), config.synthesis));

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(PdfRetrievalTool::new(
        vector_search,
        config.research_tools.pdf_retrieval.top_k,
        config.research_tools.pdf_retrieval.min_score,
    )));
    tools.register(Arc::new(WebSearchTool::new(web_search, config.research_tools.web_search.max_results)));

    let research = Arc::new(ResearchAgent::new(provider, prompts, tools, trace.clone(), config.research));

    let runner_config =
        RunnerConfig { turn_deadline: Duration::from_secs(config.runner.turn_deadline_seconds) };
    let session_ttl = Duration::from_secs(config.session_store.ttl_seconds);

    PaperQaEngine::new(orchestrator, clarification, research, synthesis, backend, trace, runner_config, session_ttl)
}
