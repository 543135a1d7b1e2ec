//! Clarification: ask one question, end the turn.

use crate::message::Message;
use crate::prompts::{format_history, AGENT_CLARIFICATION};
use crate::state::{AgentName, NextAgent, TurnState};
use async_trait::async_trait;
use layer0::{Agent, AgentError};
use paperqa_provider::prompt::compile;
use paperqa_provider::{PromptService, Provider, ProviderMessage, ProviderRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

const FALLBACK_QUESTION: &str = "Could you please provide more details about your question?";

fn default_clarification_temperature() -> f64 {
    0.5
}

fn default_max_history() -> usize {
    10
}

fn default_prompt_label() -> String {
    "production".to_string()
}

fn default_agent_clarification_name() -> String {
    AGENT_CLARIFICATION.to_string()
}

/// Static configuration for [`ClarificationAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClarificationConfig {
    /// Model identifier (`None` = provider default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_clarification_temperature")]
    pub temperature: f64,
    /// How many trailing messages to show the LLM.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Name of the prompt template to fetch.
    #[serde(default = "default_agent_clarification_name")]
    pub prompt_name: String,
    /// Label to fetch the template under.
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.5,
            max_history: 10,
            prompt_name: AGENT_CLARIFICATION.to_string(),
            prompt_label: "production".to_string(),
        }
    }
}

/// Emits one clarifying question and ends the turn.
pub struct ClarificationAgent<P: Provider, T: PromptService> {
    provider: P,
    prompts: T,
    config: ClarificationConfig,
}

impl<P: Provider, T: PromptService> ClarificationAgent<P, T> {
    /// Build a new Clarification agent.
    pub fn new(provider: P, prompts: T, config: ClarificationConfig) -> Self {
        Self { provider, prompts, config }
    }

    async fn ask(&self, state: &TurnState) -> Option<String> {
        let template = self
            .prompts
            .fetch(&self.config.prompt_name, &self.config.prompt_label)
            .await
            .ok()?;

        let history = format_history(state.history_tail(self.config.max_history));
        let query = state.latest_user_message().map(|m| m.text.clone()).unwrap_or_default();
        let mut vars = HashMap::new();
        vars.insert("history", history.as_str());
        vars.insert("query", query.as_str());
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
impl<P: Provider + Send + Sync + 'static, T: PromptService + 'static> Agent<TurnState> for ClarificationAgent<P, T> {
    async fn execute(&self, mut state: TurnState) -> Result<TurnState, AgentError> {
        let question = match self.ask(&state).await {
            Some(question) => question,
            None => {
                warn!("clarification: LLM call failed, using fallback question");
                FALLBACK_QUESTION.to_string()
            }
        };

        state.messages.push(Message::assistant(question.clone()));
        state.final_answer = Some(question);
        state.next_agent = NextAgent::End;
        state.last_agent = Some(AgentName::Clarification);
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
            Ok("clarify: {{query}}".to_string())
        }
    }

    fn new_state() -> TurnState {
        TurnState::new_turn(SessionId::new("s1"), vec![], None, 0, "tell me more")
    }

    #[tokio::test]
    async fn emits_question_and_ends_turn() {
        let agent = ClarificationAgent::new(
            MockProvider { response_text: Mutex::new(Some("Which paper do you mean?".into())) },
            MockPrompts,
            ClarificationConfig::default(),
        );
        let out = agent.execute(new_state()).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::End);
        assert_eq!(out.last_agent, Some(AgentName::Clarification));
        assert_eq!(out.final_answer, Some("Which paper do you mean?".into()));
        assert_eq!(out.messages.len(), 2);
    }

    #[tokio::test]
    async fn does_not_touch_clarification_count() {
        let agent = ClarificationAgent::new(
            MockProvider { response_text: Mutex::new(Some("q?".into())) },
            MockPrompts,
            ClarificationConfig::default(),
        );
        let mut state = new_state();
        state.clarification_count = 1;
        let out = agent.execute(state).await.unwrap();
        assert_eq!(out.clarification_count, 1);
    }

    #[tokio::test]
    async fn llm_failure_uses_fixed_fallback_question() {
        let agent = ClarificationAgent::new(
            MockProvider { response_text: Mutex::new(None) },
            MockPrompts,
            ClarificationConfig::default(),
        );
        let out = agent.execute(new_state()).await.unwrap();
        assert_eq!(out.final_answer, Some(FALLBACK_QUESTION.to_string()));
        assert_eq!(out.next_agent, NextAgent::End);
    }
}
