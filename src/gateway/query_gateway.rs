use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use serde::Serialize;
use tracing::{info, warn};

use super::{error::GatewayError, translator::SqlTranslator};
use crate::db::{QueryRow, QueryStore, StoreError, sql_guard};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub query: String,
    pub narrative: String,
    pub rows: Vec<QueryRow>,
}

impl AnalysisResult {
    pub fn render(&self) -> String {
        format!("Query executed:\n{}\n\nAnalysis:\n{}", self.query, self.narrative)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanText(pub String);

impl PlanText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Question in, vetted SQL and a narrative out. Every failure comes back as a [`GatewayError`].
#[derive(Clone)]
pub struct QueryGateway {
    store: Arc<dyn QueryStore>,
    translator: Arc<dyn SqlTranslator>,
}

impl QueryGateway {
    pub fn new(store: Arc<dyn QueryStore>, translator: Arc<dyn SqlTranslator>) -> Self {
        Self { store, translator }
    }

    pub async fn answer(&self, question: &str) -> Result<AnalysisResult, GatewayError> {
        guarded(self.answer_inner(question)).await
    }

    pub async fn explain(&self, question: &str) -> Result<PlanText, GatewayError> {
        guarded(async {
            let schema = self.describe().await?;
            let plan = self.translator.explain(question, &schema).await?;
            Ok::<_, GatewayError>(PlanText(plan))
        })
        .await
    }

    pub async fn schema_description(&self) -> Result<String, GatewayError> {
        guarded(self.describe()).await
    }

    async fn answer_inner(&self, question: &str) -> Result<AnalysisResult, GatewayError> {
        let schema = self.describe().await?;
        let raw = self.translator.translate(question, &schema).await?;

        let query = match sql_guard::ensure_read_only(&raw) {
            Ok(query) => query.to_string(),
            Err(err) => {
                warn!(query = %raw.trim(), "refusing generated query");
                return Err(GatewayError::from_store(err, raw.trim()));
            }
        };

        info!(%query, "running generated query");
        let rows = self
            .store
            .execute_read_only(&query)
            .await
            .map_err(|err| GatewayError::from_store(err, &query))?;

        let narrative = self.translator.summarize(question, &query, &rows).await?;
        Ok(AnalysisResult {
            query,
            narrative,
            rows,
        })
    }

    async fn describe(&self) -> Result<String, GatewayError> {
        self.store.table_info().await.map_err(|err| match err {
            StoreError::Db(err) => GatewayError::StorageUnavailable(err.to_string()),
            other => GatewayError::from_store(other, ""),
        })
    }
}

async fn guarded<T, F>(fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let err = GatewayError::from_panic(panic);
            warn!(error = %err, "query gateway recovered from panic");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{AnalysisResult, QueryGateway};
    use crate::{
        gateway::GatewayError,
        test_helpers::{RecordingStore, StubTranslator},
    };

    #[test]
    fn renders_query_and_narrative() {
        let result = AnalysisResult {
            query: "SELECT 1".to_string(),
            narrative: "One.".to_string(),
            rows: vec![],
        };
        assert_eq!(result.render(), "Query executed:\nSELECT 1\n\nAnalysis:\nOne.");
    }

    #[tokio::test]
    async fn store_panics_are_contained() {
        let store = Arc::new(RecordingStore::panicking());
        let gateway = QueryGateway::new(store, Arc::new(StubTranslator::new("SELECT 1")));

        let err = gateway
            .schema_description()
            .await
            .expect_err("panic should surface as an error");

        assert!(matches!(err, GatewayError::Internal(_)));
    }
}
