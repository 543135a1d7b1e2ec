//! # layer0 — Protocol traits for the corpus Q&A orchestration engine
//!
//! This crate defines the three protocol boundaries the rest of the
//! workspace composes around, plus one cross-cutting observability
//! interface.
//!
//! ## The Protocols
//!
//! | Protocol | Trait | What it does |
//! |----------|-------|-------------|
//! | ① Agent | [`Agent`] | What one agent does per invocation |
//! | ② Orchestration | [`Orchestrator`] | How the runner dispatches to a named agent |
//! | ③ State | [`StateStore`] | How data persists across turns |
//!
//! ## The Interface
//!
//! | Interface | Types | What it does |
//! |-----------|-------|-------------|
//! | ④ Trace | [`TraceSink`], [`TraceEvent`] | Structured observation, no intervention |
//!
//! ## Design Principle
//!
//! Every protocol trait is operation-defined, not mechanism-defined.
//! [`Agent::execute`] means "cause this agent to process one turn" —
//! not "make an API call." An in-process implementation and a future
//! durable/remote implementation can both satisfy the same trait.
//!
//! ## Dependency Notes
//!
//! This crate depends on `serde_json::Value` for the state store's
//! payload type. JSON is the interchange format the session record is
//! persisted as; the alternative (generic `T: Serialize`) would
//! complicate object safety for `dyn StateStore` without practical
//! benefit here.

#![deny(missing_docs)]

pub mod agent;
pub mod error;
pub mod id;
pub mod orchestrator;
pub mod state;
pub mod trace;

pub use agent::Agent;
pub use error::{AgentError, OrchError, StateError};
pub use id::{AgentId, SessionId};
pub use orchestrator::Orchestrator;
pub use state::{Scope, StateReader, StateStore};
pub use trace::{NullSink, TraceEvent, TraceSink, TracingSink, VecSink};
