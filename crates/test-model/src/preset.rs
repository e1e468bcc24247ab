use counsel_model::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// The preset response for an assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetResponse {
    /// The assistant text to return.
    pub content: String,
    /// Tool calls to request alongside the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified assistant text.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            failures: None,
        }
    }

    /// Adds a tool call request to the response.
    #[inline]
    pub fn with_tool_call(mut self, request: ToolCallRequest) -> Self {
        self.tool_calls.push(request);
        self
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_content("Let me check the database.")
            .with_tool_call(ToolCallRequest {
                id: "1".to_string(),
                name: "lookup_university_info".to_string(),
                arguments: json!({
                    "university_name": "Harvard"
                }),
            });

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }
}
