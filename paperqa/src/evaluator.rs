//! Evaluator contract: the types an external harness uses to assert
//! against a turn's trace and to request an LLM-as-judge verdict on
//! answer quality. No judge is implemented here — grading an answer's
//! quality is a call the harness makes against its own model; this
//! crate's only contribution is the [`paperqa_runner::TraceRecord`] that
//! [`crate::PaperQaEngine::chat_traced`] returns alongside the answer.

use serde::{Deserialize, Serialize};

/// What a scenario expects a turn's trace to look like. `agents_should_include`
/// and `tools_should_include` are subset checks (order not asserted);
/// `agents_should_exclude`/`tools_should_exclude` must be disjoint from
/// what the trace actually recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAssertion {
    /// Agent names the trace must contain at least once each.
    pub agents_should_include: Vec<String>,
    /// Agent names the trace must never contain.
    pub agents_should_exclude: Vec<String>,
    /// Tool names the trace must contain at least once each.
    pub tools_should_include: Vec<String>,
    /// Tool names the trace must never contain.
    pub tools_should_exclude: Vec<String>,
}

impl ScenarioAssertion {
    /// Check a [`paperqa_runner::TraceRecord`] against this assertion.
    pub fn check(&self, trace: &paperqa_runner::TraceRecord) -> WorkflowVerdict {
        let mut violations = Vec::new();

        for required in &self.agents_should_include {
            if !trace.agents.iter().any(|a| a == required) {
                violations.push(format!("expected agent '{required}' in trace, not present"));
            }
        }
        for forbidden in &self.agents_should_exclude {
            if trace.agents.iter().any(|a| a == forbidden) {
                violations.push(format!("agent '{forbidden}' must not appear in trace"));
            }
        }
        for required in &self.tools_should_include {
            if !trace.tools.iter().any(|t| t == required) {
                violations.push(format!("expected tool '{required}' in trace, not present"));
            }
        }
        for forbidden in &self.tools_should_exclude {
            if trace.tools.iter().any(|t| t == forbidden) {
                violations.push(format!("tool '{forbidden}' must not appear in trace"));
            }
        }

        if violations.is_empty() {
            WorkflowVerdict::Passed
        } else {
            WorkflowVerdict::Failed { violations }
        }
    }
}

/// The result of checking a [`ScenarioAssertion`] against a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkflowVerdict {
    /// Every assertion held.
    Passed,
    /// At least one assertion failed; `violations` describes each one.
    Failed {
        /// Human-readable descriptions of each failed assertion.
        violations: Vec<String>,
    },
}

/// A request for an external LLM-as-judge to grade one answer. The core
/// builds this value; it never sends it anywhere itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityJudgeRequest {
    /// The answer text produced by Synthesis (or the error fallback).
    pub answer: String,
    /// Free-text criteria the judge should grade the answer against.
    pub expected_answer_criteria: String,
}

/// A judge's graded response to a [`QualityJudgeRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityJudgeResponse {
    /// Overall answer quality, 0.0-1.0.
    pub answer_quality: f64,
    /// Factual correctness against the corpus, 0.0-1.0.
    pub factual_correctness: f64,
    /// Whether the answer addresses the full question, 0.0-1.0.
    pub completeness: f64,
    /// The judge's free-text reasoning for the scores above.
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperqa_runner::TraceRecord;

    fn trace() -> TraceRecord {
        TraceRecord {
            agents: vec!["orchestrator".into(), "research".into(), "synthesis".into()],
            tools: vec!["pdf_retrieval".into()],
        }
    }

    #[test]
    fn passes_when_all_assertions_hold() {
        let assertion = ScenarioAssertion {
            agents_should_include: vec!["research".into()],
            agents_should_exclude: vec!["clarification".into()],
            tools_should_include: vec!["pdf_retrieval".into()],
            tools_should_exclude: vec!["web_search".into()],
        };
        assert_eq!(assertion.check(&trace()), WorkflowVerdict::Passed);
    }

    #[test]
    fn fails_and_names_each_violation() {
        let assertion = ScenarioAssertion {
            agents_should_include: vec!["clarification".into()],
            tools_should_exclude: vec!["pdf_retrieval".into()],
            ..Default::default()
        };
        match assertion.check(&trace()) {
            WorkflowVerdict::Failed { violations } => assert_eq!(violations.len(), 2),
            WorkflowVerdict::Passed => panic!("expected failure"),
        }
    }
}
