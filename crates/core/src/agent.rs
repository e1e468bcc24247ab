mod builder;

use std::sync::Arc;

use counsel_model::{ModelMessage, ModelRequest, ToolCallRequest};

use crate::store::CheckpointStore;
use crate::thread::Thread;
use crate::tool::Registry;
pub use builder::AgentBuilder;

/// The fixed answer substituted when the model invocation fails or a turn
/// exceeds the tool round limit. This is the only failure-handling policy
/// at the loop boundary: errors become ordinary conversation content.
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I ran into a problem while answering. Please try again.";

/// The default bound on model round trips within a single user turn.
///
/// The model could in principle request tools forever. Each model
/// invocation consumes one round; when the budget is exhausted the turn
/// is closed with [`APOLOGY_MESSAGE`] instead of another invocation.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// The stage of the turn state machine.
///
/// A user message enters at `AwaitingModel`. The model either answers
/// directly (`Done`) or requests tools (`AwaitingTool`); once all tool
/// results are appended, the turn always returns to `AwaitingModel`.
enum TurnStage {
    AwaitingModel,
    AwaitingTool(Vec<ToolCallRequest>),
    Done(String),
}

/// An agent instance, which maintains a thread, a model provider, a
/// toolset, and an optional checkpoint store.
///
/// The agent is strictly sequential: one user message drives exactly one
/// pass through the turn state machine to completion before the next one
/// is accepted, and tool calls within a turn run one after another.
pub struct Agent {
    model_client: crate::model_client::ModelClient,
    registry: Registry,
    system_prompt: Option<String>,
    thread: Thread,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    max_tool_rounds: usize,
}

impl Agent {
    /// Returns the thread this agent operates on.
    #[inline]
    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    /// Handles one user message and resolves to the answer shown to the
    /// user.
    ///
    /// Model invocation errors are not propagated: the turn is closed
    /// with [`APOLOGY_MESSAGE`] as the assistant answer. Checkpointing
    /// failures are logged and do not fail the turn either.
    pub async fn handle_user_input(&mut self, input: &str) -> String {
        let turn_start = self.thread.messages().len();
        self.thread.push(ModelMessage::user(input));

        let mut stage = TurnStage::AwaitingModel;
        let mut rounds = 0;
        let answer = loop {
            stage = match stage {
                TurnStage::AwaitingModel => {
                    if rounds >= self.max_tool_rounds {
                        warn!(
                            "tool round limit reached after {rounds} rounds, \
                             closing the turn"
                        );
                        self.thread
                            .push(ModelMessage::assistant(APOLOGY_MESSAGE));
                        break APOLOGY_MESSAGE.to_owned();
                    }
                    rounds += 1;
                    self.model_step().await
                }
                TurnStage::AwaitingTool(requests) => {
                    self.tool_step(requests).await
                }
                TurnStage::Done(answer) => break answer,
            };
        };

        self.checkpoint(turn_start).await;
        answer
    }

    /// Invokes the model over the system instructions plus the full
    /// message log.
    async fn model_step(&mut self) -> TurnStage {
        let request = self.build_model_request();
        let resp = match self.model_client.send_request(request).await {
            Ok(resp) => resp,
            Err(err) => {
                error!("model invocation failed: {err}");
                self.thread.push(ModelMessage::assistant(APOLOGY_MESSAGE));
                return TurnStage::Done(APOLOGY_MESSAGE.to_owned());
            }
        };

        let content = resp.content;
        let tool_calls = resp.tool_calls;
        self.thread
            .push(ModelMessage::Assistant(counsel_model::AssistantMessage {
                content: content.clone(),
                tool_calls: tool_calls.clone(),
            }));

        // Dispatch on the presence of requests rather than on the finish
        // reason. Every persisted request must receive a result message,
        // even from a provider that mislabels the finish reason.
        if tool_calls.is_empty() {
            TurnStage::Done(content)
        } else {
            TurnStage::AwaitingTool(tool_calls)
        }
    }

    /// Resolves every pending request into a tool result message, in
    /// request order, then hands the turn back to the model.
    async fn tool_step(&mut self, requests: Vec<ToolCallRequest>) -> TurnStage {
        for req in &requests {
            let result = self.registry.dispatch(req).await;
            self.thread.push(ModelMessage::Tool(result));
        }
        TurnStage::AwaitingModel
    }

    pub(crate) fn build_model_request(&self) -> ModelRequest {
        let mut messages =
            Vec::with_capacity(self.thread.messages().len() + 1);
        // The system prompt is prepended per request and never persisted,
        // so instructions can change without rewriting stored threads.
        if let Some(prompt) = &self.system_prompt {
            messages.push(ModelMessage::system(prompt.clone()));
        }
        messages.extend(self.thread.messages().iter().cloned());
        ModelRequest {
            messages,
            tools: self.registry.definitions(),
        }
    }

    async fn checkpoint(&self, turn_start: usize) {
        let Some(store) = &self.checkpoint_store else {
            return;
        };
        let new_messages = &self.thread.messages()[turn_start..];
        if let Err(err) = store.append(self.thread.id(), new_messages).await {
            warn!(
                "failed to checkpoint thread `{}`: {err}",
                self.thread.id()
            );
        }
    }
}
