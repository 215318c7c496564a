use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use churn_analyst::{
    config::{DatabaseConfig, GeneratorConfig},
    db::{DatasetStore, QueryRow},
    gateway::{AnalystTools, GatewayError, QueryGateway, SAFETY_REFUSAL},
    seed::DatasetGenerator,
    test_helpers::{RecordingStore, StubTranslator},
};

fn count_row(count: i64) -> QueryRow {
    let mut row = QueryRow::new();
    row.insert("count".to_string(), json!(count));
    row
}

async fn generated_store(dir: &TempDir, customer_count: u32) -> DatasetStore {
    let store = DatasetStore::connect(&DatabaseConfig::sqlite_file(
        &dir.path().join("business_data.db"),
    ))
    .await
    .expect("store should open");
    store.ensure_schema().await.expect("schema should sync");
    DatasetGenerator::new(GeneratorConfig {
        customer_count,
        usage_window_days: 2,
        ..GeneratorConfig::default()
    })
    .expect("config should be valid")
    .generate(&store)
    .await
    .expect("generation should succeed");
    store
}

fn gateway(store: Arc<RecordingStore>, translator: Arc<StubTranslator>) -> QueryGateway {
    QueryGateway::new(store, translator)
}

#[tokio::test]
async fn answer_runs_the_translated_query_and_summarizes_it() {
    let store = Arc::new(RecordingStore::new(vec![count_row(20)]));
    let translator = Arc::new(
        StubTranslator::new("  SELECT COUNT(*) AS count FROM churn_events  ")
            .with_narrative("Twenty customers churned."),
    );
    let gateway = gateway(store.clone(), translator.clone());

    let result = gateway
        .answer("How many customers churned?")
        .await
        .expect("answer should succeed");

    assert_eq!(result.query, "SELECT COUNT(*) AS count FROM churn_events");
    assert_eq!(result.narrative, "Twenty customers churned.");
    assert_eq!(result.rows, vec![count_row(20)]);
    assert_eq!(store.executed(), vec![result.query.clone()]);
    assert_eq!(translator.summarized_row_counts(), vec![1]);
}

#[tokio::test]
async fn unsafe_queries_are_refused_without_running() {
    for sql in [
        "DELETE FROM customers",
        "DROP TABLE churn_events",
        "-- just checking\nUPDATE subscriptions SET mrr = 0",
    ] {
        let store = Arc::new(RecordingStore::new(vec![]));
        let gateway = gateway(store.clone(), Arc::new(StubTranslator::new(sql)));

        let err = gateway
            .answer("Please tidy the data")
            .await
            .expect_err("mutation should be refused");

        match err {
            GatewayError::RejectedUnsafeQuery { query, .. } => assert_eq!(query, sql.trim()),
            other => panic!("unexpected error for {sql}: {other:?}"),
        }
        assert!(store.executed().is_empty(), "{sql} reached the store");
    }
}

#[tokio::test]
async fn explain_never_executes() {
    let store = Arc::new(RecordingStore::new(vec![count_row(1)]));
    let translator = Arc::new(StubTranslator::new("SELECT 1").with_plan("1. SELECT ..."));
    let gateway = gateway(store.clone(), translator);

    let plan = gateway
        .explain("What drives churn?")
        .await
        .expect("explain should succeed");

    assert_eq!(plan.as_str(), "1. SELECT ...");
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn schema_description_is_the_store_table_info() {
    let store = Arc::new(RecordingStore::new(vec![]));
    let gateway = gateway(store.clone(), Arc::new(StubTranslator::new("SELECT 1")));

    let schema = gateway.schema_description().await.expect("schema");

    assert_eq!(schema, store.schema());
}

#[tokio::test]
async fn translator_failures_are_reported() {
    let store = Arc::new(RecordingStore::new(vec![]));
    let gateway = gateway(store.clone(), Arc::new(StubTranslator::failing()));

    let err = gateway.answer("Anything?").await.expect_err("should fail");

    assert!(matches!(err, GatewayError::TranslationFailed(_)));
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn translator_panics_become_internal_errors() {
    let store = Arc::new(RecordingStore::new(vec![]));
    let gateway = gateway(store, Arc::new(StubTranslator::panicking()));

    let err = gateway.answer("Anything?").await.expect_err("should fail");

    assert!(matches!(err, GatewayError::Internal(ref message) if message.contains("panicked")));
}

#[tokio::test]
async fn unavailable_store_is_reported() {
    let gateway = gateway(
        Arc::new(RecordingStore::unavailable()),
        Arc::new(StubTranslator::new("SELECT 1")),
    );

    let err = gateway.answer("Anything?").await.expect_err("should fail");

    assert!(matches!(err, GatewayError::StorageUnavailable(_)));
}

#[tokio::test]
async fn tools_render_text_for_every_outcome() {
    let store = Arc::new(RecordingStore::new(vec![count_row(20)]));
    let tools = AnalystTools::new(gateway(
        store.clone(),
        Arc::new(
            StubTranslator::new("SELECT COUNT(*) FROM churn_events")
                .with_narrative("Twenty.")
                .with_plan("Count churn events."),
        ),
    ));

    assert_eq!(
        tools
            .invoke("query_database", &json!({ "question": "How many churned?" }))
            .await,
        "Query executed:\nSELECT COUNT(*) FROM churn_events\n\nAnalysis:\nTwenty."
    );
    assert_eq!(
        tools
            .invoke(
                "explain_query_before_executing",
                &json!({ "question": "How many churned?" })
            )
            .await,
        "Query Plan:\nCount churn events."
    );
    assert_eq!(
        tools.invoke("get_database_schema", &json!({})).await,
        store.schema()
    );
    assert!(
        tools
            .invoke("drop_everything", &json!({}))
            .await
            .starts_with("Error:")
    );
    assert!(
        tools
            .invoke("query_database", &json!({}))
            .await
            .starts_with("Error:")
    );
}

#[tokio::test]
async fn tools_refuse_unsafe_queries_explicitly() {
    let store = Arc::new(RecordingStore::new(vec![]));
    let tools = AnalystTools::new(gateway(
        store.clone(),
        Arc::new(StubTranslator::new("DELETE FROM customers")),
    ));

    let reply = tools
        .invoke("query_database", &json!({ "question": "Remove churned customers" }))
        .await;

    assert_eq!(reply, SAFETY_REFUSAL);
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn tools_report_failures_as_text() {
    let tools = AnalystTools::new(gateway(
        Arc::new(RecordingStore::new(vec![])),
        Arc::new(StubTranslator::failing()),
    ));

    let reply = tools
        .invoke("query_database", &json!({ "question": "Anything?" }))
        .await;
    assert!(reply.starts_with("Error executing query: translation failed"));

    let reply = tools
        .invoke("explain_query_before_executing", &json!({ "question": "Anything?" }))
        .await;
    assert!(reply.starts_with("Error explaining query:"));
}

#[tokio::test]
async fn gateway_answers_against_a_generated_store() {
    let dir = TempDir::new().expect("temp dir");
    let store = generated_store(&dir, 5).await;

    let gateway = QueryGateway::new(
        Arc::new(store),
        Arc::new(StubTranslator::new(
            "SELECT customer_id, name FROM customers WHERE customer_id = 1",
        )),
    );

    let result = gateway
        .answer("Who is customer one?")
        .await
        .expect("answer should succeed");

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0]["name"], json!("Company 1"));
}

#[tokio::test]
async fn gateway_answers_aggregate_questions_from_real_values() {
    let dir = TempDir::new().expect("temp dir");
    let store = generated_store(&dir, 10).await;

    let translator = Arc::new(
        StubTranslator::new(
            "SELECT COUNT(*) AS churned, AVG(s.mrr) AS avg_mrr FROM churn_events c \
             JOIN subscriptions s USING (customer_id)",
        )
        .with_narrative("Two customers churned."),
    );
    let gateway = QueryGateway::new(Arc::new(store), translator.clone());

    let result = gateway
        .answer("How many customers churned and what did they pay?")
        .await
        .expect("answer should succeed");

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0]["churned"], json!(2));
    let avg_mrr = result.rows[0]["avg_mrr"]
        .as_f64()
        .expect("average should be a number");
    assert!([99.0, 299.0, 999.0, 199.0, 549.0, 649.0].contains(&avg_mrr));
    assert_eq!(translator.summarized_row_counts(), vec![1]);
}
