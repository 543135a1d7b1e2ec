//! Research: a bounded reason-act loop over a registered tool set.

use crate::message::Message;
use crate::prompts::{format_history, AGENT_RESEARCH};
use crate::state::{AgentName, Context, NextAgent, TurnState};
use async_trait::async_trait;
use layer0::{Agent, AgentError, TraceEvent, TraceSink};
use paperqa_provider::prompt::compile;
use paperqa_provider::{PromptService, Provider, ProviderMessage, ProviderRequest, ToolSchema};
use paperqa_tool::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

fn default_research_temperature() -> f64 {
    0.7
}

fn default_max_history() -> usize {
    10
}

fn default_max_iterations() -> u32 {
    10
}

fn default_prompt_label() -> String {
    "production".to_string()
}

fn default_agent_research_name() -> String {
    AGENT_RESEARCH.to_string()
}

/// Static configuration for [`ResearchAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchConfig {
    /// Model identifier (`None` = provider default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default = "default_research_temperature")]
    pub temperature: f64,
    /// How many trailing messages to show the LLM.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Hard cap on reason-act rounds (one LLM call each).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Name of the prompt template to fetch.
    #[serde(default = "default_agent_research_name")]
    pub prompt_name: String,
    /// Label to fetch the template under.
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_history: 10,
            max_iterations: 10,
            prompt_name: AGENT_RESEARCH.to_string(),
            prompt_label: "production".to_string(),
        }
    }
}

/// Gathers information by autonomously calling registered tools, then
/// hands a grounded summary to Synthesis.
pub struct ResearchAgent<P: Provider, T: PromptService> {
    provider: P,
    prompts: T,
    tools: ToolRegistry,
    trace: Arc<dyn TraceSink>,
    config: ResearchConfig,
}

impl<P: Provider, T: PromptService> ResearchAgent<P, T> {
    /// Build a new Research agent.
    pub fn new(provider: P, prompts: T, tools: ToolRegistry, trace: Arc<dyn TraceSink>, config: ResearchConfig) -> Self {
        Self { provider, prompts, tools, trace, config }
    }

    fn fatal(&self, mut state: TurnState, reason: &str) -> TurnState {
        state.context = Context {
            tool_history: vec![],
            observations: vec![format!("Research failed: {reason}")],
            final_output: "Unable to complete research due to an error.".to_string(),
        };
        state.messages.push(Message::assistant(state.context.final_output.clone()));
        state.next_agent = NextAgent::Synthesis;
        state.last_agent = Some(AgentName::Research);
        state.iteration += 1;
        state
    }

    fn finish(&self, mut state: TurnState, final_output: String, tool_history: Vec<String>) -> TurnState {
        let observations = tool_history.iter().map(|name| format!("Used tool: {name}")).collect();
        state.context = Context { tool_history, observations, final_output: final_output.clone() };
        state.messages.push(Message::assistant(final_output));
        state.next_agent = NextAgent::Synthesis;
        state.last_agent = Some(AgentName::Research);
        state.iteration += 1;
        state
    }
}

#[async_trait]
impl<P: Provider + Send + Sync + 'static, T: PromptService + 'static> Agent<TurnState> for ResearchAgent<P, T> {
    async fn execute(&self, state: TurnState) -> Result<TurnState, AgentError> {
        let template = match self.prompts.fetch(&self.config.prompt_name, &self.config.prompt_label).await {
            Ok(t) => t,
            Err(e) => return Ok(self.fatal(state, &format!("prompt template unavailable: {e}"))),
        };

        let history = format_history(state.history_tail(self.config.max_history));
        let mut vars = HashMap::new();
        vars.insert("history", history.as_str());
        let system = compile(&template, &vars);

        let tool_schemas: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|tool| ToolSchema { name: tool.name().to_string(), description: tool.description().to_string() })
            .collect();

        let query = state.latest_user_message().map(|m| m.text.clone()).unwrap_or_default();
        let mut working_messages = vec![ProviderMessage::user(query)];
        let mut tool_history: Vec<String> = vec![];
        let mut seen: HashSet<String> = HashSet::new();
        let mut last_text = String::new();

        for iteration in 1..=self.config.max_iterations {
            let request = ProviderRequest {
                model: self.config.model.clone(),
                temperature: self.config.temperature,
                system: Some(system.clone()),
                messages: working_messages.clone(),
                tools: tool_schemas.clone(),
            };

            let response = match self.provider.complete(request).await {
                Ok(r) => r,
                Err(e) => return Ok(self.fatal(state, &e.to_string())),
            };

            let calls = response.tool_calls();
            if calls.is_empty() {
                last_text = response.text();
                return Ok(self.finish(state, last_text, tool_history));
            }

            working_messages.push(ProviderMessage::assistant(response.text()));

            for (_id, name, args) in calls {
                let args_summary = args.to_string();
                self.trace.record(TraceEvent::ToolInvoked { tool: name.to_string(), args_summary }).await;

                let result = match self.tools.get(name) {
                    Some(tool) => {
                        if seen.insert(name.to_string()) {
                            tool_history.push(name.to_string());
                        }
                        match args.get("query").and_then(|v| v.as_str()) {
                            Some(query) => tool.call(query).await.unwrap_or_else(|e| format!("error: {e}")),
                            None => "error: missing required argument 'query'".to_string(),
                        }
                    }
                    None => format!("error: unknown tool '{name}'"),
                };

                let ok = !result.starts_with("error:");
                debug!(tool = name, iteration, ok, "research: tool call completed");
                self.trace.record(TraceEvent::ToolReturned { tool: name.to_string(), ok }).await;

                working_messages.push(ProviderMessage::user(format!("Tool {name} result:\n{result}")));
            }
        }

        let summary = if last_text.is_empty() { "no final answer produced".to_string() } else { last_text };
        let final_output = format!("Research stopped: iteration limit reached; partial findings: {summary}");
        Ok(self.finish(state, final_output, tool_history))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer0::{NullSink, SessionId, VecSink};
    use paperqa_provider::provider::ProviderError;
    use paperqa_provider::{ProviderResponse, ResponsePart, StopReason, TokenUsage};
    use paperqa_tool::ToolDyn;
    use serde_json::json;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct StubTool {
        name: &'static str,
        reply: &'static str,
    }

    impl ToolDyn for StubTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn call(&self, _query: &str) -> Pin<Box<dyn Future<Output = Result<String, paperqa_tool::ToolError>> + Send + '_>> {
            let reply = self.reply.to_string();
            Box::pin(async move { Ok(reply) })
        }
    }

    struct ScriptedProvider {
        responses: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    }

    impl Provider for ScriptedProvider {
        fn complete(
            &self,
            _request: ProviderRequest,
        ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send {
            let next = self.responses.lock().unwrap().pop();
            async move { next.unwrap_or(Err(ProviderError::RequestFailed("exhausted".into()))) }
        }
    }

    struct MockPrompts;

    #[async_trait]
    impl PromptService for MockPrompts {
        async fn fetch(&self, _name: &str, _label: &str) -> Result<String, paperqa_provider::PromptError> {
            Ok("research: {{history}}".to_string())
        }
    }

    fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            content: vec![ResponsePart::Text { text: text.to_string() }],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn tool_call_response(name: &str) -> ProviderResponse {
        ProviderResponse {
            content: vec![ResponsePart::ToolCall { id: "1".into(), name: name.to_string(), args: json!({"query": "x"}) }],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn new_state() -> TurnState {
        TurnState::new_turn(SessionId::new("s1"), vec![], None, 0, "What is in Section 3.2?")
    }

    #[tokio::test]
    async fn single_tool_call_then_final_text() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "pdf_retrieval", reply: "Source: a.pdf (Page 1)\nContent: x\nSimilarity: 0.9" }));

        let provider = ScriptedProvider {
            responses: Mutex::new(vec![Ok(text_response("Answer text")), Ok(tool_call_response("pdf_retrieval"))]),
        };
        let agent = ResearchAgent::new(provider, MockPrompts, registry, Arc::new(NullSink), ResearchConfig::default());

        let out = agent.execute(new_state()).await.unwrap();
        assert_eq!(out.next_agent, NextAgent::Synthesis);
        assert_eq!(out.context.tool_history, vec!["pdf_retrieval".to_string()]);
        assert_eq!(out.context.observations, vec!["Used tool: pdf_retrieval".to_string()]);
        assert_eq!(out.context.final_output, "Answer text");
        assert_eq!(out.messages.last().unwrap().text, "Answer text");
    }

    #[tokio::test]
    async fn unknown_tool_is_noop_and_loop_continues() {
        let registry = ToolRegistry::new();
        let provider = ScriptedProvider {
            responses: Mutex::new(vec![Ok(text_response("done")), Ok(tool_call_response("mystery_tool"))]),
        };
        let agent = ResearchAgent::new(provider, MockPrompts, registry, Arc::new(NullSink), ResearchConfig::default());

        let out = agent.execute(new_state()).await.unwrap();
        assert!(out.context.tool_history.is_empty());
        assert_eq!(out.context.final_output, "done");
    }

    #[tokio::test]
    async fn iteration_cap_forces_termination() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "pdf_retrieval", reply: "stuff" }));

        let provider = ScriptedProvider {
            responses: Mutex::new(vec![Ok(tool_call_response("pdf_retrieval")), Ok(tool_call_response("pdf_retrieval"))]),
        };
        let config = ResearchConfig { max_iterations: 1, ..Default::default() };
        let agent = ResearchAgent::new(provider, MockPrompts, registry, Arc::new(NullSink), config);

        let out = agent.execute(new_state()).await.unwrap();
        assert!(out.context.final_output.starts_with("Research stopped: iteration limit reached"));
        assert_eq!(out.next_agent, NextAgent::Synthesis);
        assert_eq!(out.context.tool_history, vec!["pdf_retrieval".to_string()]);
    }

    #[tokio::test]
    async fn fatal_provider_error_routes_to_synthesis_with_error_output() {
        let registry = ToolRegistry::new();
        let provider = ScriptedProvider { responses: Mutex::new(vec![]) };
        let agent = ResearchAgent::new(provider, MockPrompts, registry, Arc::new(NullSink), ResearchConfig::default());

        let out = agent.execute(new_state()).await.unwrap();
        assert_eq!(out.context.tool_history, Vec::<String>::new());
        assert_eq!(out.context.final_output, "Unable to complete research due to an error.");
        assert_eq!(out.next_agent, NextAgent::Synthesis);
    }

    #[tokio::test]
    async fn tool_invocation_emits_trace_events() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool { name: "web_search", reply: "Title: x\nURL: y\nContent: z" }));
        let provider = ScriptedProvider {
            responses: Mutex::new(vec![Ok(text_response("ok")), Ok(tool_call_response("web_search"))]),
        };
        let sink = Arc::new(VecSink::new());
        let agent = ResearchAgent::new(provider, MockPrompts, registry, sink.clone(), ResearchConfig::default());

        agent.execute(new_state()).await.unwrap();
        let events = sink.events();
        assert!(events.iter().any(|e| matches!(e, TraceEvent::ToolInvoked { tool, .. } if tool == "web_search")));
        assert!(events.iter().any(|e| matches!(e, TraceEvent::ToolReturned { tool, ok } if tool == "web_search" && *ok)));
    }
}
