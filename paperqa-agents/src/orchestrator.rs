//! Orchestrator: decide Clarification vs Research, loop-free by design.

use crate::message::MessageKind;
use crate::prompts::{format_history, AGENT_ORCHESTRATOR};
use crate::state::{AgentName, NextAgent, TurnState};
use async_trait::async_trait;
use layer0::{Agent, AgentError};
use paperqa_provider::prompt::compile;
use paperqa_provider::{PromptService, Provider, ProviderMessage, ProviderRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

fn default_orchestrator_temperature() -> f64 {
    0.3
}

fn default_max_history() -> usize {
    10
}

fn default_max_clarifications() -> u32 {
    2
}

fn default_prompt_label() -> String {
    "production".to_string()
}

/// Static configuration for [`OrchestratorAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Model identifier (`None` = provider default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature for the L3 classification call.
    #[serde(default = "default_orchestrator_temperature")]
    pub temperature: f64,
    /// How many trailing messages to show the LLM.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Consecutive-clarification bound (L1 emergency brake).
    #[serde(default = "default_max_clarifications")]
    pub max_clarifications: u32,
    /// Name of the prompt template to fetch.
    #[serde(default = "default_agent_orchestrator_name")]
    pub prompt_name: String,
    /// Label to fetch the template under (e.g. "dev", "production").
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

fn default_agent_orchestrator_name() -> String {
    AGENT_ORCHESTRATOR.to_string()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.3,
            max_history: 10,
            max_clarifications: 2,
            prompt_name: AGENT_ORCHESTRATOR.to_string(),
            prompt_label: "production".to_string(),
        }
    }
}

/// Decides Clarification vs Research for the latest user message.
///
/// Three layers run in order; the first that fires wins. L1 and L2 are
/// pure state inspection (no LLM call); only L3 reaches the model.
pub struct OrchestratorAgent<P: Provider, T: PromptService> {
    provider: P,
    prompts: T,
    config: OrchestratorConfig,
}

impl<P: Provider, T: PromptService> OrchestratorAgent<P, T> {
    /// Build a new Orchestrator agent.
    pub fn new(provider: P, prompts: T, config: OrchestratorConfig) -> Self {
        Self { provider, prompts, config }
    }

    async fn classify(&self, state: &TurnState) -> Option<NextAgent> {
        let template = self
            .prompts
            .fetch(&self.config.prompt_name, &self.config.prompt_label)
            .await
            .ok()?;

        let history = format_history(state.history_tail(self.config.max_history));
        let clarification_count = state.clarification_count.to_string();
        let max_clarifications = self.config.max_clarifications.to_string();
        let mut vars = HashMap::new();
        vars.insert("history", history.as_str());
        vars.insert("clarification_count", clarification_count.as_str());
        vars.insert("max_clarifications", max_clarifications.as_str());
        let system = compile(&template, &vars);

        let request = ProviderRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            system: Some(system),
            messages: vec![ProviderMessage::user(
                state.latest_user_message().map(|m| m.text.as_str()).unwrap_or_default(),
            )],
            tools: vec![],
        };

        let response = self.provider.complete(request).await.ok()?;
        let text = response.text().to_uppercase();
        let has_clarification = text.contains("CLARIFICATION");
        let has_research = text.contains("RESEARCH");
        Some(if has_clarification && !has_research { NextAgent::Clarification } else { NextAgent::Research })
    }
}

#[async_trait]
impl<P: Provider + Send + Sync + 'static, T: PromptService + 'static> Agent<TurnState> for OrchestratorAgent<P, T> {
    async fn execute(&self, mut state: TurnState) -> Result<TurnState, AgentError> {
        // L1 — hard counter.
        if state.clarification_count >= self.config.max_clarifications {
            debug!(clarification_count = state.clarification_count, "orchestrator: L1 forces research");
            state.next_agent = NextAgent::Research;
            state.clarification_count = 0;
            state.last_agent = Some(AgentName::Orchestrator);
            state.iteration += 1;
            return Ok(state);
        }

        // L2 — follow-up pattern detection.
        if state.last_agent == Some(AgentName::Clarification) && state.last_two_are_assistant_then_user() {
            debug!("orchestrator: L2 forces research (reply to clarification)");
            state.next_agent = NextAgent::Research;
            state.clarification_count = 0;
            state.last_agent = Some(AgentName::Orchestrator);
            state.iteration += 1;
            return Ok(state);
        }

        // L3 — LLM classification, defaulting to Research on any failure
        // or ambiguity (forward progress is the safer default). A provider
        // failure (`None`) is not the same as the LLM choosing Research:
        // the former leaves `clarification_count` unchanged, since the user
        // was never actually routed to Clarification.
        match self.classify(&state).await {
            Some(NextAgent::Clarification) => {
                debug!("orchestrator: L3 routes to clarification");
                state.next_agent = NextAgent::Clarification;
                state.clarification_count += 1;
            }
            Some(_) => {
                debug!("orchestrator: L3 routes to research");
                state.next_agent = NextAgent::Research;
                state.clarification_count = 0;
            }
            None => {
                debug!("orchestrator: L3 classification failed, falling back to research");
                state.next_agent = NextAgent::Research;
            }
        }
        state.last_agent = Some(AgentName::Orchestrator);
        state.iteration += 1;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use layer0::SessionId;
    use paperqa_provider::provider::ProviderError;
    use paperqa_provider::{ProviderResponse, ResponsePart, StopReason, TokenUsage};
    use std::sync::Mutex;

    struct MockProvider {
        response_text: Mutex<Option<String>>,
    }

    impl Provider for MockProvider {
        fn complete(
            &self,
            _request: ProviderRequest,
        ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
            let text = self.response_text.lock().unwrap().clone();
            async move {
                match text {
                    Some(text) => Ok(ProviderResponse {
                        content: vec![ResponsePart::Text { text }],
                        stop_reason: StopReason::EndTurn,
                        usage: TokenUsage::default(),
                    }),
                    None => Err(ProviderError::RequestFailed("boom".into())),
                }
            }
        }
    }

    struct MockPrompts;

    #[async_trait]
    impl PromptService for MockPrompts {
        async fn fetch(&self, _name: &str, _label: &str) -> Result<String, paperqa_provider::PromptError> {
            Ok("classify: {{history}}".to_string())
        }
    }

    fn state_with(clarification_count: u32, last_agent: Option<AgentName>, messages: Vec<Message>) -> TurnState {
        TurnState::new_turn(SessionId::new("s1"), messages, last_agent, clarification_count, "latest")
    }

    #[tokio::test]
    async fn l1_forces_research_at_cap() {
        let agent = OrchestratorAgent::new(
            MockProvider { response_text: Mutex::new(Some("CLARIFICATION".into())) },
            MockPrompts,
            OrchestratorConfig { max_clarifications: 2, ..Default::default() },
        );
        let state = state_with(2, None, vec![]);
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Research);
        assert_eq!(out.clarification_count, 0);
    }

    #[tokio::test]
    async fn l2_forces_research_after_clarification_reply() {
        let agent = OrchestratorAgent::new(
            MockProvider { response_text: Mutex::new(Some("CLARIFICATION".into())) },
            MockPrompts,
            OrchestratorConfig::default(),
        );
        let state = state_with(1, Some(AgentName::Clarification), vec![Message::assistant("which paper?")]);
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Research);
        assert_eq!(out.clarification_count, 0);
    }

    #[tokio::test]
    async fn l3_routes_to_clarification_on_ambiguous_question() {
        let agent = OrchestratorAgent::new(
            MockProvider { response_text: Mutex::new(Some("CLARIFICATION".into())) },
            MockPrompts,
            OrchestratorConfig::default(),
        );
        let state = state_with(0, None, vec![]);
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Clarification);
        assert_eq!(out.clarification_count, 1);
    }

    #[tokio::test]
    async fn l3_defaults_to_research_on_both_tokens_present() {
        let agent = OrchestratorAgent::new(
            MockProvider { response_text: Mutex::new(Some("CLARIFICATION or RESEARCH".into())) },
            MockPrompts,
            OrchestratorConfig::default(),
        );
        let state = state_with(0, None, vec![]);
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Research);
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_research_with_count_unchanged() {
        let agent = OrchestratorAgent::new(
            MockProvider { response_text: Mutex::new(None) },
            MockPrompts,
            OrchestratorConfig::default(),
        );
        let state = state_with(1, None, vec![]);
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Research);
        assert_eq!(out.clarification_count, 1);
    }
}
