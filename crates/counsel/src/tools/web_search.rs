use counsel_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

const SEARCH_ENDPOINT: &str = "https://api.duckduckgo.com/";

const NO_RESULTS_MESSAGE: &str = "No search results found.";

const MAX_RELATED_TOPICS: usize = 5;

#[derive(Deserialize, JsonSchema)]
pub struct WebSearchParameters {
    #[schemars(
        description = "The search query for lists, rankings, or admission \
                       guides."
    )]
    query: String,
}

/// The subset of the DuckDuckGo Instant Answer response we render.
///
/// Related topics may be nested category groups without a `Text` field,
/// so every field tolerates absence.
#[derive(Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Deserialize)]
struct RelatedTopic {
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
}

/// A tool that searches the web via the DuckDuckGo Instant Answer API.
pub struct WebSearchTool {
    client: reqwest::Client,
    parameter_schema: Value,
}

impl WebSearchTool {
    /// Creates a new web search tool.
    pub fn new() -> Self {
        WebSearchTool {
            client: reqwest::Client::new(),
            parameter_schema: schema_for!(WebSearchParameters).to_value(),
        }
    }
}

impl Default for WebSearchTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WebSearchTool {
    type Input = WebSearchParameters;

    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        r#"
Search the web for general advice, university lists, or admission deadlines
when the database does not have specific info."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WebSearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let resp = client
                .get(SEARCH_ENDPOINT)
                .query(&[
                    ("q", input.query.as_str()),
                    ("format", "json"),
                    ("no_html", "1"),
                ])
                .send()
                .await
                .map_err(|err| {
                    ToolError::execution_error().with_reason(err.to_string())
                })?;
            if !resp.status().is_success() {
                return Err(ToolError::execution_error().with_reason(
                    format!("search returned status {}", resp.status()),
                ));
            }

            let answer: InstantAnswer =
                resp.json().await.map_err(|err| {
                    ToolError::execution_error().with_reason(err.to_string())
                })?;
            Ok(render_results(&answer))
        }
    }
}

fn render_results(answer: &InstantAnswer) -> String {
    let mut result = String::new();

    if !answer.abstract_text.is_empty() {
        if !answer.heading.is_empty() {
            result.push_str(&answer.heading);
            result.push_str(": ");
        }
        result.push_str(&answer.abstract_text);
        if !answer.abstract_url.is_empty() {
            result.push_str(" (");
            result.push_str(&answer.abstract_url);
            result.push(')');
        }
        result.push('\n');
    }

    for topic in answer
        .related_topics
        .iter()
        .filter(|topic| !topic.text.is_empty())
        .take(MAX_RELATED_TOPICS)
    {
        result.push_str("- ");
        result.push_str(&topic.text);
        if !topic.first_url.is_empty() {
            result.push_str(" (");
            result.push_str(&topic.first_url);
            result.push(')');
        }
        result.push('\n');
    }

    if result.is_empty() {
        return NO_RESULTS_MESSAGE.to_owned();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_abstract_and_topics() {
        let answer: InstantAnswer = serde_json::from_str(
            r#"{
                "Heading": "Harvard University",
                "AbstractText": "Harvard is a private research university.",
                "AbstractURL": "https://en.wikipedia.org/wiki/Harvard_University",
                "RelatedTopics": [
                    {
                        "Text": "Harvard College - The undergraduate school.",
                        "FirstURL": "https://duckduckgo.com/Harvard_College"
                    },
                    { "Name": "Schools" }
                ]
            }"#,
        )
        .unwrap();

        let rendered = render_results(&answer);
        assert!(rendered.starts_with(
            "Harvard University: Harvard is a private research university."
        ));
        assert!(rendered.contains("- Harvard College"));
        // The nested category group has no text and must be skipped.
        assert!(!rendered.contains("Schools"));
    }

    #[test]
    fn test_render_empty_answer() {
        let answer: InstantAnswer = serde_json::from_str("{}").unwrap();
        assert_eq!(render_results(&answer), NO_RESULTS_MESSAGE);
    }
}
