//! A local fake model for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use counsel_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Clone)]
enum ConversationStep {
    UserInput,
    ToolResult,
    AssistantResponse(PresetResponse),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script,
/// which is how the model should respond to a request. The steps are
/// selected according to the history messages in your request: the
/// response for a request with `n` non-system messages is taken from step
/// `n` of the script. If there are no enough steps in the script, an
/// error will be returned.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    conversation_script: Vec<ConversationStep>,
    attempts: Arc<Mutex<HashMap<usize, u64>>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends an assistant response step to the script.
    #[inline]
    pub fn add_assistant_response_step(&mut self, preset: PresetResponse) {
        self.conversation_script
            .push(ConversationStep::AssistantResponse(preset));
    }

    /// Appends a user input step to the script.
    #[inline]
    pub fn add_user_input_step(&mut self) {
        self.conversation_script.push(ConversationStep::UserInput);
    }

    /// Appends a tool result step to the script.
    #[inline]
    pub fn add_tool_result_step(&mut self) {
        self.conversation_script.push(ConversationStep::ToolResult);
    }

    /// Sets an artificial delay before each response.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    fn respond(&self, req: &ModelRequest) -> Result<ModelResponse, Error> {
        let step_idx = req
            .messages
            .iter()
            .filter(|msg| !matches!(msg, ModelMessage::System { .. }))
            .count();
        if step_idx >= self.conversation_script.len() {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::RateLimitExceeded,
            });
        }

        let preset = match &self.conversation_script[step_idx] {
            ConversationStep::UserInput | ConversationStep::ToolResult => {
                return Err(Error {
                    message: "not an assistant response step",
                    kind: ErrorKind::Moderated,
                });
            }
            ConversationStep::AssistantResponse(preset) => preset,
        };

        if let Some(failures) = preset.failures {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = attempts.entry(step_idx).or_insert(0);
            *attempt += 1;
            if failures == 0 || *attempt <= failures {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::Other,
                });
            }
        }

        Ok(ModelResponse {
            content: preset.content.clone(),
            tool_calls: preset.tool_calls.clone(),
            finish_reason: if preset.tool_calls.is_empty() {
                ModelFinishReason::Stop
            } else {
                ModelFinishReason::ToolCalls
            },
        })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let resp = self.respond(req);
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            resp
        }
    }
}

#[cfg(test)]
mod tests {
    use counsel_model::{ModelTool, ToolCallRequest};
    use serde_json::json;

    use super::*;

    fn lookup_tool() -> ModelTool {
        ModelTool {
            name: "lookup_university_info".to_owned(),
            description: "Looks up a university summary".to_owned(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "university_name": {
                        "type": "string",
                        "description": "The full name of the university"
                    }
                }
            }),
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(
            PresetResponse::with_content("Hello, world!"),
        );
        provider.add_user_input_step();
        provider.add_assistant_response_step(
            PresetResponse::with_content("Sure, let me take a look.")
                .with_tool_call(ToolCallRequest {
                    id: "tool:1".to_owned(),
                    name: "lookup_university_info".to_owned(),
                    arguments: json!({ "university_name": "Harvard" }),
                }),
        );

        let mut req = ModelRequest {
            messages: vec![ModelMessage::user("Hi")],
            tools: vec![lookup_tool()],
        };
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content, "Hello, world!");
        assert_eq!(resp.finish_reason, ModelFinishReason::Stop);

        req.messages.push(ModelMessage::assistant(resp.content));
        req.messages
            .push(ModelMessage::user("Tell me about Harvard"));
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content, "Sure, let me take a look.");
        assert_eq!(resp.finish_reason, ModelFinishReason::ToolCalls);
        let tool_call = &resp.tool_calls[0];
        assert_eq!(tool_call.name, "lookup_university_info");
        assert_eq!(
            tool_call.arguments,
            json!({ "university_name": "Harvard" })
        );
    }

    #[tokio::test]
    async fn test_system_messages_are_not_counted() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(
            PresetResponse::with_content("Hi there!"),
        );

        let req = ModelRequest {
            messages: vec![
                ModelMessage::system("Be helpful."),
                ModelMessage::user("Hi"),
            ],
            tools: vec![],
        };
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content, "Hi there!");
    }

    #[tokio::test]
    async fn test_preset_failures() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(
            PresetResponse::with_content("Recovered").with_failures(1),
        );

        let req = ModelRequest {
            messages: vec![ModelMessage::user("Hi")],
            tools: vec![],
        };
        assert!(provider.send_request(&req).await.is_err());
        let resp = provider.send_request(&req).await.unwrap();
        assert_eq!(resp.content, "Recovered");
    }
}
