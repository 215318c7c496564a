use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use churn_analyst::{
    config::AppConfig,
    db::DatasetStore,
    gateway::{QueryGateway, build_translator},
    logging::init_tracing,
    seed::DatasetGenerator,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("churn analyst failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);

    let store = DatasetStore::connect(&cfg.database)
        .await
        .context("failed to open dataset store")?;
    store
        .ensure_schema()
        .await
        .context("failed to create dataset schema")?;

    let generator = DatasetGenerator::new(cfg.generator.clone())?;
    let summary = generator.generate(&store).await?;
    tracing::info!(
        generated_on = %summary.generated_on,
        "dataset ready with {} customers",
        summary.customers
    );

    let Some(translator_cfg) = cfg.translator.as_ref() else {
        tracing::info!("no translator configured; skipping question loop");
        return Ok(());
    };

    let translator = build_translator(translator_cfg)?;
    let gateway = QueryGateway::new(Arc::new(store), translator);

    tracing::info!("reading questions from stdin, one per line");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        match gateway.answer(question).await {
            Ok(result) => println!("{}\n", result.render()),
            Err(err) => println!("{}\n", err.message()),
        }
    }
    Ok(())
}
