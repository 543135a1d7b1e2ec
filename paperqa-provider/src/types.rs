//! Internal lingua franca types for one LLM gateway call.
//!
//! These are not wire types for any specific vendor API — providers
//! convert to/from these.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// A user message.
    User,
    /// A prior assistant message.
    Assistant,
}

/// A single part of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool-call intent the model wants executed.
    ToolCall {
        /// Unique id for this call, used to correlate the result.
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// Arguments for the call.
        args: serde_json::Value,
    },
}

/// A message in the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub text: String,
}

impl ProviderMessage {
    /// Build a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    /// Build an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }
}

/// A tool the model may choose to call, described for the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name.
    pub name: String,
    /// Human-readable description of when to use it.
    pub description: String,
}

/// Request sent to a provider for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model identifier (`None` = provider default).
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
    /// System prompt, compiled from the named template for the calling agent.
    pub system: Option<String>,
    /// Conversation history formatted as plain messages.
    pub messages: Vec<ProviderMessage>,
    /// Tools the model may call. Empty for agents that don't use tools.
    pub tools: Vec<ToolSchema>,
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a final response with no further tool calls.
    EndTurn,
    /// The model wants to call one or more tools.
    ToolUse,
    /// The model hit its output token limit.
    MaxTokens,
}

/// Token usage for a single provider call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

/// Response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Response parts — text and/or tool-call intents.
    pub content: Vec<ResponsePart>,
    /// Why the provider stopped.
    pub stop_reason: StopReason,
    /// Token usage for this call.
    pub usage: TokenUsage,
}

impl ProviderResponse {
    /// Concatenate every `Text` part into one string, ignoring tool calls.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|p| match p {
                ResponsePart::Text { text } => Some(text.as_str()),
                ResponsePart::ToolCall { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Every tool-call intent in this response, in order.
    pub fn tool_calls(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|p| match p {
                ResponsePart::ToolCall { id, name, args } => Some((id.as_str(), name.as_str(), args)),
                ResponsePart::Text { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_concatenates_text_parts_only() {
        let response = ProviderResponse {
            content: vec![
                ResponsePart::Text { text: "hello ".into() },
                ResponsePart::ToolCall { id: "1".into(), name: "x".into(), args: json!({}) },
                ResponsePart::Text { text: "world".into() },
            ],
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        };
        assert_eq!(response.text(), "hello world");
    }

    #[test]
    fn tool_calls_extracts_only_tool_parts() {
        let response = ProviderResponse {
            content: vec![
                ResponsePart::Text { text: "thinking".into() },
                ResponsePart::ToolCall { id: "1".into(), name: "pdf_retrieval".into(), args: json!({"query": "x"}) },
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "pdf_retrieval");
    }
}
