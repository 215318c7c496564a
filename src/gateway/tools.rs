//! Text-in, text-out wrappers around [`QueryGateway`] for an agent loop.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{error::GatewayError, query_gateway::QueryGateway};

pub const QUERY_DATABASE: &str = "query_database";
pub const EXPLAIN_QUERY: &str = "explain_query_before_executing";
pub const GET_SCHEMA: &str = "get_database_schema";

pub const SAFETY_REFUSAL: &str =
    "SAFETY CHECK FAILED: Only SELECT queries are allowed. Query was rejected.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Clone)]
pub struct AnalystTools {
    gateway: QueryGateway,
}

impl AnalystTools {
    pub fn new(gateway: QueryGateway) -> Self {
        Self { gateway }
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: QUERY_DATABASE,
                description: "Query the business database to answer an analytical question. \
                              Returns the SQL that ran and a plain-English analysis.",
                input_schema: question_schema(),
            },
            ToolDefinition {
                name: EXPLAIN_QUERY,
                description: "Explain which SQL query would answer a question without \
                              executing it. Use it to review a query first.",
                input_schema: question_schema(),
            },
            ToolDefinition {
                name: GET_SCHEMA,
                description: "Describe the available tables, their columns and a few sample rows.",
                input_schema: json!({ "type": "object", "properties": {} }),
            },
        ]
    }

    /// Always returns text; failures are reported inside it.
    pub async fn invoke(&self, name: &str, input: &Value) -> String {
        debug!(tool = name, "invoking analyst tool");
        match name {
            QUERY_DATABASE => match question(input) {
                Ok(question) => match self.gateway.answer(question).await {
                    Ok(result) => result.render(),
                    Err(GatewayError::RejectedUnsafeQuery { .. }) => SAFETY_REFUSAL.to_string(),
                    Err(err) => format!("Error executing query: {}", err.message()),
                },
                Err(message) => message,
            },
            EXPLAIN_QUERY => match question(input) {
                Ok(question) => match self.gateway.explain(question).await {
                    Ok(plan) => format!("Query Plan:\n{plan}"),
                    Err(err) => format!("Error explaining query: {}", err.message()),
                },
                Err(message) => message,
            },
            GET_SCHEMA => match self.gateway.schema_description().await {
                Ok(schema) => schema,
                Err(err) => format!("Error: {}", err.message()),
            },
            other => format!("Error: unknown tool '{other}'"),
        }
    }
}

fn question_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "question": {
                "type": "string",
                "description": "A natural language question about the business data"
            }
        },
        "required": ["question"]
    })
}

fn question(input: &Value) -> Result<&str, String> {
    input
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|question| !question.is_empty())
        .ok_or_else(|| "Error: missing required string argument 'question'".to_string())
}
