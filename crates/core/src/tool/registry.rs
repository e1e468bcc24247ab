use std::collections::HashMap;

use counsel_model::{ModelTool, ToolCallRequest, ToolCallResult};

use crate::tool::{Error, ToolObject};

/// A registry that holds the closed set of tools and resolves requests
/// from the model.
///
/// Every request resolves to a result: a missing tool or a failing tool
/// produces error text instead of a propagated error, so the model always
/// sees a matching result message for each of its requests.
#[derive(Default)]
pub struct Registry {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Registry {
    pub fn add_tool(&mut self, tool: Box<dyn ToolObject>) {
        let name = tool.name().to_owned();
        self.tools.insert(name, tool);
    }

    /// Tool declarations for the model, sorted by name so that rebuilding
    /// a request from the same thread always yields the same input.
    pub fn definitions(&self) -> Vec<ModelTool> {
        let mut definitions: Vec<ModelTool> = self
            .tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub async fn dispatch(&self, req: &ToolCallRequest) -> ToolCallResult {
        let span = debug_span!("tool dispatch", tool = %req.name);
        let _enter = span.enter();

        let result = match self.tools.get(&req.name) {
            Some(tool) => {
                trace!("running tool ({}) with args: {:?}", req.id, req.arguments);
                tool.execute(req.arguments.clone()).await
            }
            None => {
                warn!("tool not found: {}", req.name);
                Err(Error::unknown_tool()
                    .with_reason(format!("no tool named `{}`", req.name)))
            }
        };

        let content = match result {
            Ok(content) => content,
            Err(err) => format!("Error occurred: {}", err.reason()),
        };
        ToolCallResult {
            id: req.id.clone(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{AnyTool, Tool, ToolResult};

    static EMPTY_SCHEMA: &Value = &Value::Null;

    struct TestTool;

    impl Tool for TestTool {
        type Input = serde_json::Value;

        fn name(&self) -> &str {
            "test_tool"
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn parameter_schema(&self) -> &Value {
            EMPTY_SCHEMA
        }

        fn execute(
            &self,
            _input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok("success".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_dispatch() {
        let mut registry = Registry::default();
        registry.add_tool(Box::new(AnyTool(TestTool)));

        let result = registry
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "test_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.id, "tool:1");
        assert_eq!(result.content, "success");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let mut registry = Registry::default();
        registry.add_tool(Box::new(AnyTool(TestTool)));

        let result = registry
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "read_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.id, "tool:1");
        assert!(result.content.starts_with("Error occurred:"));
        assert!(result.content.contains("read_tool"));
    }

    #[test]
    fn test_definitions_are_sorted() {
        struct NamedTool(&'static str);

        impl Tool for NamedTool {
            type Input = serde_json::Value;

            fn name(&self) -> &str {
                self.0
            }

            fn description(&self) -> &str {
                ""
            }

            fn parameter_schema(&self) -> &Value {
                EMPTY_SCHEMA
            }

            fn execute(
                &self,
                _input: Self::Input,
            ) -> impl Future<Output = ToolResult> + Send + 'static {
                ready(Ok(String::new()))
            }
        }

        let mut registry = Registry::default();
        registry.add_tool(Box::new(AnyTool(NamedTool("web_search"))));
        registry.add_tool(Box::new(AnyTool(NamedTool("lookup"))));

        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, ["lookup", "web_search"]);
    }
}
