#![deny(missing_docs)]
//! # paperqa — multi-agent corpus Q&A orchestration engine
//!
//! A single facade (`PaperQaEngine`) over the Turn Runner and the four
//! agents (Orchestrator, Clarification, Research, Synthesis), wired
//! through the `layer0` protocol traits. No HTTP types appear in this
//! crate — transport is the caller's concern.

pub mod config;
pub mod engine;
pub mod evaluator;

pub use config::{EngineConfig, ResearchToolsConfig, RunnerSettingsConfig, SessionStoreConfig};
pub use engine::{build_engine, ChatResponse, EngineError, HistoryEntry, PaperQaEngine};
pub use evaluator::{QualityJudgeRequest, QualityJudgeResponse, ScenarioAssertion, WorkflowVerdict};

/// Happy-path imports for composing a `PaperQaEngine`.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{build_engine, ChatResponse, EngineError, HistoryEntry, PaperQaEngine};
    pub use crate::evaluator::{QualityJudgeRequest, QualityJudgeResponse, ScenarioAssertion, WorkflowVerdict};
    pub use layer0::{AgentId, NullSink, Scope, SessionId, StateReader, StateStore, TraceEvent, TraceSink, TracingSink, VecSink};
    pub use paperqa_agents::{AgentName, Context, NextAgent, SessionRecord, TurnState};
    pub use paperqa_provider::{PromptService, Provider, VectorSearch, WebSearch};
    pub use paperqa_provider_anthropic::AnthropicProvider;
    pub use paperqa_runner::{RunnerConfig, RunnerError, TraceRecord, TurnOutcome, TurnRunner};
    pub use paperqa_state::{FsStore, MemoryStore, SessionStore};
    pub use paperqa_tool::{ToolDyn, ToolError, ToolRegistry};
}
