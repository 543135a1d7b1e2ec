//! Synthesis: turn Research's findings into the final, cited answer.

use crate::message::Message;
use crate::prompts::AGENT_SYNTHESIS;
use crate::state::{AgentName, NextAgent, TurnState};
use async_trait::async_trait;
use layer0::{Agent, AgentError};
use paperqa_provider::prompt::compile;
use paperqa_provider::{PromptService, Provider, ProviderMessage, ProviderRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

const FIXED_ERROR_ANSWER: &str = "I was unable to synthesize an answer due to an internal error.";

fn default_synthesis_temperature() -> f64 {
    0.7
}

fn default_prompt_label() -> String {
    "production".to_string()
}

fn default_agent_synthesis_name() -> String {
    AGENT_SYNTHESIS.to_string()
}

/// Static configuration for [`SynthesisAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Model identifier (`None` = provider default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_synthesis_temperature")]
    pub temperature: f64,
    /// Name of the prompt template to fetch.
    #[serde(default = "default_agent_synthesis_name")]
    pub prompt_name: String,
    /// Label to fetch the template under.
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self { model: None, temperature: 0.7, prompt_name: AGENT_SYNTHESIS.to_string(), prompt_label: "production".to_string() }
    }
}

/// Deterministic confidence from the distinct-tool count Research used.
pub fn confidence_for_tool_count(distinct_tools: usize) -> f64 {
    match distinct_tools {
        0 => 0.0,
        1 => 0.6,
        2 => 0.8,
        _ => 0.95,
    }
}

/// Produces the final, grounded, cited answer from Research's findings.
pub struct SynthesisAgent<P: Provider, T: PromptService> {
    provider: P,
    prompts: T,
    config: SynthesisConfig,
}

impl<P: Provider, T: PromptService> SynthesisAgent<P, T> {
    /// Build a new Synthesis agent.
    pub fn new(provider: P, prompts: T, config: SynthesisConfig) -> Self {
        Self { provider, prompts, config }
    }

    async fn synthesize(&self, state: &TurnState) -> Option<String> {
        let template = self
            .prompts
            .fetch(&self.config.prompt_name, &self.config.prompt_label)
            .await
            .ok()?;

        let query = state.latest_user_message().map(|m| m.text.clone()).unwrap_or_default();
        let evidence = {
            let mut lines = state.context.observations.clone();
            lines.push(state.context.final_output.clone());
            lines.join("\n")
        };
        let mut vars = HashMap::new();
        vars.insert("query", query.as_str());
        vars.insert("evidence", evidence.as_str());
        let system = compile(&template, &vars);

        let request = ProviderRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            system: Some(system),
            messages: vec![ProviderMessage::user(query)],
            tools: vec![],
        };

        let response = self.provider.complete(request).await.ok()?;
        let text = response.text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl<P: Provider + Send + Sync + 'static, T: PromptService + 'static> Agent<TurnState> for SynthesisAgent<P, T> {
    async fn execute(&self, mut state: TurnState) -> Result<TurnState, AgentError> {
        let distinct_tools = state.context.tool_history.len();

        let (answer, confidence) = match self.synthesize(&state).await {
            Some(answer) => (answer, confidence_for_tool_count(distinct_tools)),
            None => {
                warn!("synthesis: LLM call failed, falling back to research's final_output");
                let fallback = if !state.context.final_output.is_empty() {
                    state.context.final_output.clone()
                } else {
                    FIXED_ERROR_ANSWER.to_string()
                };
                (fallback, 0.0)
            }
        };

        state.messages.push(Message::assistant(answer.clone()));
        state.final_answer = Some(answer);
        state.confidence = Some(confidence);
        state.next_agent = NextAgent::End;
        state.last_agent = Some(AgentName::Synthesis);
        state.iteration += 1;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
            Ok("synth: {{query}} / {{evidence}}".to_string())
        }
    }

    fn state_with_tools(tool_history: Vec<&str>) -> TurnState {
        let mut state = TurnState::new_turn(SessionId::new("s1"), vec![], None, 0, "What is in Section 3.2?");
        state.context.tool_history = tool_history.into_iter().map(String::from).collect();
        state.context.final_output = "Research found relevant passages.".to_string();
        state
    }

    #[test]
    fn confidence_mapping_matches_spec() {
        assert_eq!(confidence_for_tool_count(0), 0.0);
        assert_eq!(confidence_for_tool_count(1), 0.6);
        assert_eq!(confidence_for_tool_count(2), 0.8);
        assert_eq!(confidence_for_tool_count(3), 0.95);
        assert_eq!(confidence_for_tool_count(10), 0.95);
    }

    #[tokio::test]
    async fn single_tool_yields_point_six_confidence() {
        let agent = SynthesisAgent::new(
            MockProvider { response_text: Mutex::new(Some("Zhang et al. discuss this on page 7.".into())) },
            MockPrompts,
            SynthesisConfig::default(),
        );
        let out = agent.execute(state_with_tools(vec!["pdf_retrieval"])).await.unwrap();
        assert_eq!(out.confidence, Some(0.6));
        assert_eq!(out.next_agent, NextAgent::End);
        assert!(out.final_answer.unwrap().contains("Zhang"));
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_research_output_with_zero_confidence() {
        let agent = SynthesisAgent::new(
            MockProvider { response_text: Mutex::new(None) },
            MockPrompts,
            SynthesisConfig::default(),
        );
        let out = agent.execute(state_with_tools(vec!["pdf_retrieval", "web_search"])).await.unwrap();
        assert_eq!(out.confidence, Some(0.0));
        assert_eq!(out.final_answer, Some("Research found relevant passages.".to_string()));
    }

    #[tokio::test]
    async fn llm_failure_with_no_research_output_uses_fixed_error() {
        let agent = SynthesisAgent::new(
            MockProvider { response_text: Mutex::new(None) },
            MockPrompts,
            SynthesisConfig::default(),
        );
        let mut state = state_with_tools(vec![]);
        state.context.final_output.clear();
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.final_answer, Some(FIXED_ERROR_ANSWER.to_string()));
        assert_eq!(out.confidence, Some(0.0));
    }
}
