use std::any::Any;

use super::translator::TranslationError;
use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("translation failed: {0}")]
    TranslationFailed(#[from] TranslationError),
    #[error("query rejected ({reason}): {query}")]
    RejectedUnsafeQuery { query: String, reason: String },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Maps a store failure for `query` onto the gateway's vocabulary.
    pub fn from_store(err: StoreError, query: &str) -> Self {
        match err {
            StoreError::StorageUnavailable(message) => GatewayError::StorageUnavailable(message),
            StoreError::NotReadOnly { reason } => GatewayError::RejectedUnsafeQuery {
                query: query.to_string(),
                reason,
            },
            StoreError::Db(err) => GatewayError::QueryFailed(err.to_string()),
        }
    }

    pub fn from_panic(panic: Box<dyn Any + Send + 'static>) -> Self {
        let details = if let Some(message) = panic.downcast_ref::<String>() {
            message.as_str()
        } else if let Some(message) = panic.downcast_ref::<&str>() {
            message
        } else {
            "unknown panic"
        };
        GatewayError::Internal(details.to_string())
    }
}
