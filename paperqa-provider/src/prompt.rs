//! The prompt template service (consumed).
//!
//! `fetch(name, label) -> template`; `compile(template, variables) ->
//! string`. The core requires exactly five template names:
//! `agent_orchestrator`, `agent_clarification`, `agent_research`,
//! `agent_synthesis`, and (for the evaluator contract)
//! `evaluation_quality`.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from the prompt template service.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PromptError {
    /// No template exists under the given (name, label).
    #[error("template not found: {name} ({label})")]
    NotFound {
        /// Template name that was requested.
        name: String,
        /// Label that was requested.
        label: String,
    },

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Fetches named, labeled prompt templates.
#[async_trait]
pub trait PromptService: Send + Sync {
    /// Fetch a template by (name, label), e.g. `("agent_orchestrator", "production")`.
    async fn fetch(&self, name: &str, label: &str) -> Result<String, PromptError>;
}

/// Compile a template against a variable map using `{{var}}` substitution.
///
/// This is deliberately the simplest thing that works for the four
/// agent prompts and the evaluator's quality-judge prompt — no control
/// flow, no escaping rules beyond literal substitution.
pub fn compile(template: &str, variables: &HashMap<&str, &str>) -> String {
    let mut out = template.to_string();
    for (key, value) in variables {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_substitutes_variables() {
        let mut vars = HashMap::new();
        vars.insert("name", "Zhang");
        let out = compile("Hello {{name}}!", &vars);
        assert_eq!(out, "Hello Zhang!");
    }

    #[test]
    fn compile_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        let out = compile("Hello {{name}}!", &vars);
        assert_eq!(out, "Hello {{name}}!");
    }
}
