use counsel_model::{
    ModelFinishReason, ModelMessage, ModelRequest, ModelResponse, ModelTool,
    ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    /// The arguments as a JSON-encoded string, as the API delivers them.
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: Option<String>,
    pub function: FunctionToolCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System { content } => Message::System {
            content: content.clone(),
        },
        ModelMessage::User { content } => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(assistant_msg) => Message::Assistant {
            content: Some(assistant_msg.content.clone()),
            tool_calls: if assistant_msg.tool_calls.is_empty() {
                None
            } else {
                Some(
                    assistant_msg
                        .tool_calls
                        .iter()
                        .map(create_tool_call)
                        .collect(),
                )
            },
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_tool_call(req: &ToolCallRequest) -> ToolCall {
    ToolCall {
        id: req.id.clone(),
        r#type: Some("function".to_owned()),
        function: FunctionToolCall {
            name: req.name.clone(),
            arguments: req.arguments.to_string(),
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

pub fn parse_response(mut completion: ChatCompletion) -> ModelResponse {
    let Some(choice) = completion.choices.pop() else {
        return ModelResponse {
            content: String::new(),
            tool_calls: vec![],
            finish_reason: ModelFinishReason::Stop,
        };
    };

    let tool_calls: Vec<ToolCallRequest> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tool_call| ToolCallRequest {
            id: tool_call.id,
            name: tool_call.function.name,
            arguments: serde_json::from_str::<Value>(
                &tool_call.function.arguments,
            )
            .unwrap_or_default(),
        })
        .collect();

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("tool_calls") => ModelFinishReason::ToolCalls,
        _ if !tool_calls.is_empty() => ModelFinishReason::ToolCalls,
        _ => ModelFinishReason::Stop,
    };

    ModelResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        finish_reason,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::system("You are a career counsellor."),
                ModelMessage::user("Hello"),
            ],
            tools: vec![ModelTool {
                name: "web_search".to_owned(),
                description: "Searches the web.".to_owned(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query."
                        }
                    }
                }),
            }],
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Message::System {
                    content: "You are a career counsellor.".to_owned(),
                },
                Message::User {
                    content: "Hello".to_owned(),
                },
            ],
            tools: vec![Tool {
                r#type: "function",
                function: FunctionTool {
                    name: "web_search".to_owned(),
                    description: "Searches the web.".to_owned(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query."
                            }
                        }
                    }),
                },
            }],
        };
        assert_eq!(create_request(&request, &config), expected);
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "lookup_university_info",
                            "arguments": "{\"university_name\":\"Harvard\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let resp = parse_response(completion);
        assert_eq!(resp.finish_reason, ModelFinishReason::ToolCalls);
        assert_eq!(resp.content, "");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].name, "lookup_university_info");
        assert_eq!(
            resp.tool_calls[0].arguments,
            json!({ "university_name": "Harvard" })
        );
    }

    #[test]
    fn test_parse_response_plain_answer() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "chatcmpl-2",
            "choices": [{
                "message": { "content": "Harvard is in Cambridge." },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let resp = parse_response(completion);
        assert_eq!(resp.finish_reason, ModelFinishReason::Stop);
        assert_eq!(resp.content, "Harvard is in Cambridge.");
        assert!(resp.tool_calls.is_empty());
    }
}
