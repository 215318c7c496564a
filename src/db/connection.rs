use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use super::dao::{StoreError, StoreResult};
use crate::config::DatabaseConfig;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

pub fn supports_url(url: &str) -> bool {
    url.trim().to_ascii_lowercase().starts_with("sqlite:")
}

/// Opens the single-file store and applies the per-connection pragmas.
pub async fn connect(cfg: &DatabaseConfig) -> StoreResult<DatabaseConnection> {
    if !supports_url(&cfg.url) {
        return Err(StoreError::storage_unavailable(format!(
            "unsupported database url '{}'; expected scheme sqlite:",
            redact_url(&cfg.url)
        )));
    }

    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .map_err(|err| StoreError::storage_unavailable(err.to_string()))?;
    post_connect(&db)
        .await
        .map_err(|err| StoreError::storage_unavailable(err.to_string()))?;

    info!(url = %redact_url(&cfg.url), "opened dataset store");
    Ok(db)
}

async fn post_connect(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
        .await?;
    Ok(())
}

fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    match trimmed.split_once('?') {
        Some((path, _)) => format!("{path}?<options>"),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{connect, redact_url, supports_url};
    use crate::config::DatabaseConfig;
    use crate::db::dao::StoreError;

    #[test]
    fn accepts_only_sqlite_urls() {
        assert!(supports_url("sqlite://business_data.db?mode=rwc"));
        assert!(supports_url(" SQLITE::memory:"));
        assert!(!supports_url("postgres://localhost/db"));
    }

    #[test]
    fn hides_connection_options() {
        assert_eq!(
            redact_url("sqlite://data.db?mode=rwc"),
            "sqlite://data.db?<options>"
        );
    }

    #[tokio::test]
    async fn reports_unsupported_scheme_as_storage_unavailable() {
        let cfg = DatabaseConfig {
            url: "mysql://localhost/db".to_string(),
            ..DatabaseConfig::default()
        };

        let err = connect(&cfg).await.expect_err("mysql url should be refused");

        assert!(matches!(err, StoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn reports_unreachable_file_as_storage_unavailable() {
        let cfg = DatabaseConfig {
            url: "sqlite:///nonexistent-dir/for/sure/data.db".to_string(),
            ..DatabaseConfig::default()
        };

        let err = connect(&cfg).await.expect_err("missing directory should fail");

        assert!(matches!(err, StoreError::StorageUnavailable(_)));
    }
}
