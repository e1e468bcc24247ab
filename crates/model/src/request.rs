use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ToolCallRequest;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// A complete message in a thread.
///
/// The enum is internally tagged by `role` so that persisted threads read
/// naturally in the checkpoint store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ModelMessage {
    /// The system instructions.
    System {
        /// The instruction text.
        content: String,
    },
    /// A user input text.
    User {
        /// The input text.
        content: String,
    },
    /// An assistant message, optionally carrying tool call requests.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
}

impl ModelMessage {
    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Creates a text-only assistant message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::Assistant(AssistantMessage {
            content: content.into(),
            tool_calls: vec![],
        })
    }
}

/// An assistant message.
///
/// When the model requests tools, the requests are recorded here so that
/// the matching [`ToolCallResult`] messages can be linked back by id, and
/// so that replaying a persisted thread keeps the full tool call context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    /// The assistant text, possibly empty for pure tool call turns.
    pub content: String,
    /// Tool calls requested alongside the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool.
    ///
    /// For most model providers, the parameters should typically be
    /// defined by a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_roundtrip() {
        let messages = vec![
            ModelMessage::system("Be helpful."),
            ModelMessage::user("Tell me about Harvard"),
            ModelMessage::Assistant(AssistantMessage {
                content: String::new(),
                tool_calls: vec![ToolCallRequest {
                    id: "tool:1".to_owned(),
                    name: "lookup_university_info".to_owned(),
                    arguments: json!({ "university_name": "Harvard" }),
                }],
            }),
            ModelMessage::Tool(ToolCallResult {
                id: "tool:1".to_owned(),
                content: "Harvard is a private university.".to_owned(),
            }),
        ];

        let serialized = serde_json::to_string(&messages).unwrap();
        let deserialized: Vec<ModelMessage> =
            serde_json::from_str(&serialized).unwrap();
        assert_eq!(messages, deserialized);
    }

    #[test]
    fn test_message_role_tags() {
        let value =
            serde_json::to_value(ModelMessage::user("Hello")).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "Hello" }));

        let value =
            serde_json::to_value(ModelMessage::assistant("Hi")).unwrap();
        assert_eq!(value, json!({ "role": "assistant", "content": "Hi" }));
    }
}
