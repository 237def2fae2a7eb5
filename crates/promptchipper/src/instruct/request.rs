//! # Instruct Requests
//!
//! The structured conversation consumed by an [`crate::InstructAdapter`].
//! All types are `serde` (de)serializable; messages are tagged by `role`:
//!
//! ```json
//! {
//!   "messages": [
//!     { "role": "user", "content": "What's the weather in Paris?" },
//!     { "role": "assistant", "tool_calls": [
//!       { "id": "abc123456", "function": { "name": "get_weather", "arguments": { "city": "Paris" } } }
//!     ] },
//!     { "role": "tool", "name": "get_weather", "content": "22C", "tool_call_id": "abc123456" }
//!   ],
//!   "available_tools": [
//!     { "type": "function", "function": { "name": "get_weather", "parameters": {} } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A system message; its content joins the system prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    /// The message text.
    pub content: String,
}

/// A user message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    /// The message text.
    pub content: String,
}

/// An assistant message.
///
/// Exactly one of `content` and `tool_calls` must be present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool invocations requested by the assistant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

/// The result of a tool invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMessage {
    /// The name of the tool.
    pub name: String,

    /// The tool output.
    pub content: String,

    /// The id of the [`ToolCall`] this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// One turn of a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    /// See [`SystemMessage`].
    System(SystemMessage),

    /// See [`UserMessage`].
    User(UserMessage),

    /// See [`AssistantMessage`].
    Assistant(AssistantMessage),

    /// See [`ToolMessage`].
    Tool(ToolMessage),
}

impl ChatMessage {
    /// A system message.
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::System(SystemMessage {
            content: content.into(),
        })
    }

    /// A user message.
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::User(UserMessage {
            content: content.into(),
        })
    }

    /// An assistant text message.
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::Assistant(AssistantMessage {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        })
    }

    /// An assistant message requesting tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::Assistant(AssistantMessage {
            content: None,
            tool_calls: calls,
        })
    }

    /// A tool result message.
    pub fn tool<N, C>(
        name: N,
        content: C,
        tool_call_id: Option<String>,
    ) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        Self::Tool(ToolMessage {
            name: name.into(),
            content: content.into(),
            tool_call_id,
        })
    }

    /// The role tag of this message.
    pub fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
            Self::Tool(_) => "tool",
        }
    }
}

/// The kind of a [`Tool`] or [`ToolCall`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    /// A callable function.
    #[default]
    Function,
}

/// A function definition offered to the model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// The function name.
    pub name: String,

    /// A description of what the function does.
    #[serde(default)]
    pub description: String,

    /// The JSON schema of the arguments.
    #[serde(default)]
    pub parameters: Value,
}

/// A tool available to the model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// The tool kind.
    #[serde(rename = "type", default)]
    pub tool_type: ToolType,

    /// The function definition.
    pub function: Function,
}

impl Tool {
    /// A function tool.
    pub fn function<N, D>(
        name: N,
        description: D,
        parameters: Value,
    ) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            tool_type: ToolType::Function,
            function: Function {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// The function and arguments of a [`ToolCall`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The function name.
    pub name: String,

    /// The arguments; an object, or a string holding JSON.
    #[serde(default)]
    pub arguments: Value,
}

/// A tool invocation requested by the assistant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The call id, echoed by the matching [`ToolMessage`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The call kind.
    #[serde(rename = "type", default)]
    pub tool_type: ToolType,

    /// The function invocation.
    pub function: FunctionCall,
}

impl ToolCall {
    /// A function call.
    pub fn function<N: Into<String>>(
        id: Option<String>,
        name: N,
        arguments: Value,
    ) -> Self {
        Self {
            id,
            tool_type: ToolType::Function,
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// A conversation to flatten into tokens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructRequest {
    /// The turns, in order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// A system prompt, placed before any [`SystemMessage`] content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Tools offered to the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_tools: Vec<Tool>,
}

impl InstructRequest {
    /// A request over messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt<S: Into<String>>(
        self,
        system_prompt: S,
    ) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            ..self
        }
    }

    /// Set the available tools.
    pub fn with_tools(
        self,
        available_tools: Vec<Tool>,
    ) -> Self {
        Self {
            available_tools,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_request() {
        let doc = json!({
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Weather?" },
                { "role": "assistant", "tool_calls": [
                    { "id": "c1", "function": { "name": "weather", "arguments": { "city": "Paris" } } }
                ] },
                { "role": "tool", "name": "weather", "content": "sunny", "tool_call_id": "c1" },
                { "role": "assistant", "content": "Sunny." }
            ],
            "available_tools": [
                { "type": "function", "function": { "name": "weather", "parameters": { "type": "object" } } }
            ]
        });

        let request: InstructRequest = serde_json::from_value(doc).unwrap();

        assert_eq!(
            request.messages.iter().map(ChatMessage::role).collect::<Vec<_>>(),
            vec!["system", "user", "assistant", "tool", "assistant"]
        );
        assert_eq!(request.system_prompt, None);
        assert_eq!(
            request.messages[2],
            ChatMessage::tool_calls(vec![ToolCall::function(
                Some("c1".to_string()),
                "weather",
                json!({ "city": "Paris" })
            )])
        );
        assert_eq!(
            request.messages[3],
            ChatMessage::tool("weather", "sunny", Some("c1".to_string()))
        );
        assert_eq!(
            request.available_tools,
            vec![Tool::function("weather", "", json!({ "type": "object" }))]
        );
    }

    #[test]
    fn test_serialize_message() {
        assert_eq!(
            serde_json::to_value(ChatMessage::user("hi")).unwrap(),
            json!({ "role": "user", "content": "hi" })
        );
        assert_eq!(
            serde_json::to_value(ChatMessage::assistant("ok")).unwrap(),
            json!({ "role": "assistant", "content": "ok" })
        );
    }

    #[test]
    fn test_unknown_role() {
        let doc = json!({ "messages": [{ "role": "narrator", "content": "..." }] });
        assert!(serde_json::from_value::<InstructRequest>(doc).is_err());
    }
}
