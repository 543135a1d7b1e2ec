#![deny(missing_docs)]
//! The four turn agents and the `TurnState` data model they operate on.
//!
//! Each agent implements `layer0::Agent<TurnState>`, generic over a
//! concrete `Provider` and `PromptService` so the object-safe boundary
//! stays at the `Agent` trait rather than at the LLM call itself.

pub mod clarification;
pub mod message;
pub mod orchestrator;
pub mod prompts;
pub mod research;
pub mod state;
pub mod synthesis;
pub mod tools;

pub use clarification::{ClarificationAgent, ClarificationConfig};
pub use message::{Message, MessageKind};
pub use orchestrator::{OrchestratorAgent, OrchestratorConfig};
pub use research::{ResearchAgent, ResearchConfig};
pub use state::{AgentName, Context, NextAgent, SessionRecord, TurnState};
pub use synthesis::{confidence_for_tool_count, SynthesisAgent, SynthesisConfig};
pub use tools::{PdfRetrievalTool, WebSearchTool, PDF_RETRIEVAL, WEB_SEARCH};
