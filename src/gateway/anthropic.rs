use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::translator::{SqlTranslator, TranslationError};
use crate::{config::TranslatorConfig, db::QueryRow};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_PROMPT_ROWS: usize = 200;

const SQL_SYSTEM_PROMPT: &str = "You are a SQLite expert. Given a database schema and a business \
question, write one syntactically correct SQLite SELECT statement that answers it. Use only the \
tables and columns present in the schema. Never modify data. Reply with the SQL only, without \
commentary or markdown.";

const ANALYST_SYSTEM_PROMPT: &str = "You are a data analyst who helps business stakeholders \
understand their data. Explain findings in plain English for a non-technical audience. Provide \
context and insights, not just raw numbers. Flag concerning trends or patterns, and say so \
plainly when the data does not support a clear conclusion.";

/// Anthropic Messages API client.
pub struct AnthropicTranslator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicTranslator {
    pub fn new(cfg: &TranslatorConfig) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|err| TranslationError::Client(err.to_string()))?;

        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            endpoint: format!("{}/v1/messages", cfg.base_url.trim_end_matches('/')),
            max_tokens: cfg.max_tokens,
        })
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, TranslationError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, "calling translator");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| TranslationError::Network(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("translator rate limited");
            return Err(TranslationError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let data: MessagesResponse = response
            .json()
            .await
            .map_err(|err| TranslationError::InvalidResponse(err.to_string()))?;
        response_text(data)
    }
}

#[async_trait]
impl SqlTranslator for AnthropicTranslator {
    async fn translate(&self, question: &str, schema: &str) -> Result<String, TranslationError> {
        let prompt = format!("Database schema:\n{schema}\n\nQuestion: {question}");
        let reply = self.complete(SQL_SYSTEM_PROMPT, &prompt).await?;
        extract_sql(&reply)
            .ok_or_else(|| TranslationError::InvalidResponse("reply contained no SQL".to_string()))
    }

    async fn summarize(
        &self,
        question: &str,
        sql: &str,
        rows: &[QueryRow],
    ) -> Result<String, TranslationError> {
        let prompt = summary_prompt(question, sql, rows);
        self.complete(ANALYST_SYSTEM_PROMPT, &prompt).await
    }

    async fn explain(&self, question: &str, schema: &str) -> Result<String, TranslationError> {
        let prompt = format!(
            "Given this database schema:\n{schema}\n\n\
             Write the SQL query to answer: {question}\n\n\
             Provide:\n\
             1. The SQL query\n\
             2. What the query does\n\
             3. Which tables and columns it uses\n\
             4. Any potential concerns"
        );
        self.complete(ANALYST_SYSTEM_PROMPT, &prompt).await
    }
}

fn response_text(data: MessagesResponse) -> Result<String, TranslationError> {
    let text: Vec<String> = data
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();
    let text = text.join("\n");
    if text.trim().is_empty() {
        return Err(TranslationError::InvalidResponse(
            "response had no text content".to_string(),
        ));
    }
    Ok(text)
}

fn summary_prompt(question: &str, sql: &str, rows: &[QueryRow]) -> String {
    let shown = &rows[..rows.len().min(MAX_PROMPT_ROWS)];
    let rendered = serde_json::to_string_pretty(shown).unwrap_or_else(|_| "[]".to_string());
    let mut prompt = format!(
        "Question: {question}\n\nSQL executed:\n{sql}\n\nResult rows ({} total):\n{rendered}",
        rows.len()
    );
    if shown.len() < rows.len() {
        prompt.push_str(&format!("\n(only the first {} rows are shown)", shown.len()));
    }
    prompt.push_str("\n\nAnswer the question from these results.");
    prompt
}

/// Pulls the statement out of a reply, dropping markdown fences.
pub fn extract_sql(reply: &str) -> Option<String> {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        if let Some(end) = text.rfind("```") {
            text = &text[..end];
        }
    }
    let sql = text.trim();
    (!sql.is_empty()).then(|| sql.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ContentBlock, MessagesResponse, extract_sql, response_text, summary_prompt};
    use crate::{db::QueryRow, gateway::TranslationError};

    #[test]
    fn strips_code_fences() {
        assert_eq!(
            extract_sql("```sql\nSELECT COUNT(*) FROM customers;\n```").as_deref(),
            Some("SELECT COUNT(*) FROM customers;")
        );
        assert_eq!(
            extract_sql("  SELECT 1  ").as_deref(),
            Some("SELECT 1")
        );
        assert_eq!(extract_sql("```\n```"), None);
        assert_eq!(extract_sql("   "), None);
    }

    #[test]
    fn joins_text_blocks_and_rejects_empty_replies() {
        let data = MessagesResponse {
            content: vec![
                ContentBlock {
                    kind: "text".to_string(),
                    text: Some("SELECT".to_string()),
                },
                ContentBlock {
                    kind: "tool_use".to_string(),
                    text: None,
                },
                ContentBlock {
                    kind: "text".to_string(),
                    text: Some("1".to_string()),
                },
            ],
        };
        assert_eq!(response_text(data).expect("text"), "SELECT\n1");

        let err = response_text(MessagesResponse { content: vec![] }).expect_err("empty");
        assert!(matches!(err, TranslationError::InvalidResponse(_)));
    }

    #[test]
    fn parses_messages_api_payload() {
        let raw = json!({
            "id": "msg_1",
            "type": "message",
            "content": [{ "type": "text", "text": "There are 20 churned customers." }],
            "stop_reason": "end_turn"
        });
        let data: MessagesResponse = serde_json::from_value(raw).expect("payload should parse");
        assert_eq!(
            response_text(data).expect("text"),
            "There are 20 churned customers."
        );
    }

    #[test]
    fn summary_prompt_caps_rows() {
        let rows: Vec<QueryRow> = (0..250)
            .map(|n| {
                let mut row = QueryRow::new();
                row.insert("n".to_string(), json!(n));
                row
            })
            .collect();

        let prompt = summary_prompt("how many?", "SELECT n FROM t", &rows);

        assert!(prompt.contains("(250 total)"));
        assert!(prompt.contains("only the first 200 rows"));
    }
}
