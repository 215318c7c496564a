use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    db::{QueryRow, QueryStore, StoreError, StoreResult, sql_guard},
    gateway::{SqlTranslator, TranslationError},
};

/// Deterministic translator with scripted replies.
pub struct StubTranslator {
    sql: String,
    narrative: String,
    plan: String,
    fail: bool,
    panic: bool,
    summarized: Mutex<Vec<usize>>,
}

impl StubTranslator {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            narrative: "stub narrative".to_string(),
            plan: "stub plan".to_string(),
            fail: false,
            panic: false,
            summarized: Mutex::new(Vec::new()),
        }
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = plan.into();
        self
    }

    /// Every call fails as if the provider rate limited us.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::new("")
        }
    }

    /// Row counts passed to `summarize`, in call order.
    pub fn summarized_row_counts(&self) -> Vec<usize> {
        self.summarized
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), TranslationError> {
        if self.panic {
            panic!("stub translator panicked");
        }
        if self.fail {
            return Err(TranslationError::RateLimited);
        }
        Ok(())
    }
}

#[async_trait]
impl SqlTranslator for StubTranslator {
    async fn translate(&self, _question: &str, _schema: &str) -> Result<String, TranslationError> {
        self.check()?;
        Ok(self.sql.clone())
    }

    async fn summarize(
        &self,
        _question: &str,
        _sql: &str,
        rows: &[QueryRow],
    ) -> Result<String, TranslationError> {
        self.check()?;
        if let Ok(mut calls) = self.summarized.lock() {
            calls.push(rows.len());
        }
        Ok(self.narrative.clone())
    }

    async fn explain(&self, _question: &str, _schema: &str) -> Result<String, TranslationError> {
        self.check()?;
        Ok(self.plan.clone())
    }
}

/// In-memory [`QueryStore`] that records every statement it is asked to run.
pub struct RecordingStore {
    schema: String,
    rows: Vec<QueryRow>,
    unavailable: bool,
    panic: bool,
    executed: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(rows: Vec<QueryRow>) -> Self {
        Self {
            schema: "CREATE TABLE customers (customer_id INTEGER PRIMARY KEY)".to_string(),
            rows,
            unavailable: false,
            panic: false,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> StoreResult<()> {
        if self.panic {
            panic!("recording store panicked");
        }
        if self.unavailable {
            return Err(StoreError::storage_unavailable("store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryStore for RecordingStore {
    async fn table_info(&self) -> StoreResult<String> {
        self.check()?;
        Ok(self.schema.clone())
    }

    async fn execute_read_only(&self, sql: &str) -> StoreResult<Vec<QueryRow>> {
        if let Ok(mut calls) = self.executed.lock() {
            calls.push(sql.to_string());
        }
        self.check()?;
        sql_guard::ensure_read_only(sql)?;
        Ok(self.rows.clone())
    }
}
