#![deny(missing_docs)]
//! Tool interface and registry for the Research agent.
//!
//! Defines [`ToolDyn`] for object-safe tool abstraction and
//! [`ToolRegistry`] for managing the finite, pre-registered set of
//! tools the Research agent is allowed to call. Tools are pure
//! functions from a query string to a text payload — they carry no
//! durable state and never throw: a failing tool returns an
//! error-text payload, which the registry and the agent's loop treat
//! as a normal (if unhelpful) observation, never as a Rust `Err` that
//! propagates out of the loop.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors from tool registry operations. Not returned by a successful
/// tool call — a tool call that fails returns `Ok(error_text)` from
/// [`ToolDyn::call`]; this type covers registry-level problems.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found in the registry.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Object-safe trait for a single registered tool.
///
/// `pdf_retrieval` and `web_search` are the two tools named in the
/// spec; both take a single free-text query and return a formatted
/// text payload with source attributions baked in.
pub trait ToolDyn: Send + Sync {
    /// The tool's stable name, as the LLM will reference it.
    fn name(&self) -> &str;

    /// Human-readable description consumed by the LLM to decide when
    /// to call this tool.
    fn description(&self) -> &str;

    /// Invoke the tool with a free-text query and return its text
    /// result. A tool that cannot satisfy the query (no hits, remote
    /// failure) still returns `Ok` with an explanatory payload — this
    /// method is effectively infallible from the caller's point of
    /// view; `Err` is reserved for cases the registry itself detects.
    fn call(&self, query: &str) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + '_>>;
}

/// Registry of tools available to the Research agent for one turn.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool. Overwrites any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolDyn>> {
        self.tools.get(name)
    }

    /// Iterate over all registered tools (name, description) — what the
    /// Research agent passes to the LLM as the tool registry contract.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolDyn>> {
        self.tools.values()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
