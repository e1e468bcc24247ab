use counsel_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;

/// The fixed text returned when no row matches the requested university.
///
/// The system prompt instructs the model to treat this text as "no
/// information available" rather than as ground truth.
const NO_SUMMARY_MESSAGE: &str = "No summary found in the database.";

#[derive(Deserialize, JsonSchema)]
pub struct UniversityLookupParameters {
    #[schemars(
        description = "The full name of the university to search for \
                       (e.g. 'Harvard')."
    )]
    university_name: String,
}

/// A tool that looks up curated university summaries in Postgres.
///
/// The lookup matches `uni_name` with `ILIKE '%name%'` to be robust
/// against spelling differences, and picks the most recent row.
pub struct UniversityLookupTool {
    pool: PgPool,
    parameter_schema: Value,
}

impl UniversityLookupTool {
    /// Creates a new lookup tool backed by the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        UniversityLookupTool {
            pool,
            parameter_schema: schema_for!(UniversityLookupParameters)
                .to_value(),
        }
    }
}

impl Tool for UniversityLookupTool {
    type Input = UniversityLookupParameters;

    fn name(&self) -> &str {
        "lookup_university_info"
    }

    fn description(&self) -> &str {
        r#"
Use this tool to find detailed information about a university.
This tool queries the SQL database to find the curated summary for the university."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: UniversityLookupParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let pool = self.pool.clone();
        async move {
            let pattern = like_pattern(&input.university_name);
            let row: Option<(String,)> = sqlx::query_as(
                "SELECT summary FROM university \
                 WHERE uni_name ILIKE $1 \
                 ORDER BY time_stamp DESC LIMIT 1",
            )
            .bind(&pattern)
            .fetch_optional(&pool)
            .await
            .map_err(|err| {
                ToolError::execution_error().with_reason(err.to_string())
            })?;

            Ok(summary_or_sentinel(row.map(|(summary,)| summary)))
        }
    }
}

fn like_pattern(university_name: &str) -> String {
    format!("%{}%", university_name.trim())
}

fn summary_or_sentinel(row: Option<String>) -> String {
    match row {
        Some(summary) => summary,
        None => NO_SUMMARY_MESSAGE.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("Harvard"), "%Harvard%");
        assert_eq!(like_pattern("  MIT "), "%MIT%");
    }

    #[test]
    fn test_summary_or_sentinel() {
        assert_eq!(
            summary_or_sentinel(Some(
                "Harvard is a private research university.".to_owned()
            )),
            "Harvard is a private research university."
        );
        assert_eq!(summary_or_sentinel(None), NO_SUMMARY_MESSAGE);
    }

    #[test]
    fn test_parameter_schema_names_the_field() {
        let schema = schema_for!(UniversityLookupParameters).to_value();
        let properties = schema.get("properties").unwrap();
        assert!(properties.get("university_name").is_some());
    }
}
