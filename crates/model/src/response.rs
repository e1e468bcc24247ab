use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completed response from the model provider.
///
/// Providers return responses whole. The conversation loop is strictly
/// sequential, so there is no streaming surface here: one request, one
/// fully received response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelResponse {
    /// The assistant text, possibly empty for pure tool call turns.
    pub content: String,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating.
    pub finish_reason: ModelFinishReason,
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The argument object to pass to the tool.
    pub arguments: Value,
}
