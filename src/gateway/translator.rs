use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::anthropic::AnthropicTranslator;
use crate::{config::TranslatorConfig, db::QueryRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorProviderId {
    Anthropic,
}

impl TranslatorProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            TranslatorProviderId::Anthropic => "anthropic",
        }
    }
}

impl std::str::FromStr for TranslatorProviderId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(TranslatorProviderId::Anthropic),
            other => Err(format!("unsupported translator provider: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed provider output: {0}")]
    InvalidResponse(String),
}

/// Turns questions into SQL and query results into prose.
#[async_trait]
pub trait SqlTranslator: Send + Sync {
    async fn translate(&self, question: &str, schema: &str) -> Result<String, TranslationError>;

    async fn summarize(
        &self,
        question: &str,
        sql: &str,
        rows: &[QueryRow],
    ) -> Result<String, TranslationError>;

    /// Describes the query it would write, without anything being run.
    async fn explain(&self, question: &str, schema: &str) -> Result<String, TranslationError>;
}

pub fn build_translator(cfg: &TranslatorConfig) -> Result<Arc<dyn SqlTranslator>, TranslationError> {
    match cfg.provider {
        TranslatorProviderId::Anthropic => Ok(Arc::new(AnthropicTranslator::new(cfg)?)),
    }
}
