//! The conversation's unit of record.

use serde::{Deserialize, Serialize};

/// Which kind of turn content a [`Message`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A message from the end user.
    User,
    /// A message produced by an agent, shown to the user.
    Assistant,
    /// Research's internal record of a tool-call intent. Never appended
    /// to a session's persisted `messages` — kept for completeness of
    /// the type, used only within Research's working list.
    ToolCall,
    /// Research's internal record of a tool result. Same caveat as
    /// `ToolCall`.
    ToolResult,
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// What kind of content this is.
    pub kind: MessageKind,
    /// The message text.
    pub text: String,
    /// Name of the tool, for `ToolCall`/`ToolResult` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Arguments of a tool call, for `ToolCall` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<String>,
    /// The tool's result text, for `ToolResult` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
}

impl Message {
    /// Build a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::User, text: text.into(), tool_name: None, tool_args: None, result_text: None }
    }

    /// Build an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Assistant, text: text.into(), tool_name: None, tool_args: None, result_text: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_and_assistant_constructors_set_kind() {
        assert_eq!(Message::user("hi").kind, MessageKind::User);
        assert_eq!(Message::assistant("hi").kind, MessageKind::Assistant);
    }

    #[test]
    fn serde_roundtrip_omits_absent_optionals() {
        let msg = Message::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("tool_name"));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
