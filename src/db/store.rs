use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, FromQueryResult,
    JsonValue, QueryResult, Statement, TransactionTrait,
};
use tracing::{debug, info};

use super::{
    connection,
    dao::{StoreError, StoreResult},
    sql_guard,
};
use crate::config::DatabaseConfig;

pub type QueryRow = serde_json::Map<String, JsonValue>;

const SAMPLE_ROWS: u64 = 3;

/// The read side of the store the gateway depends on.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// Schema DDL plus a few sample rows per table.
    async fn table_info(&self) -> StoreResult<String>;

    /// Runs `sql` after the read-only guard accepts it.
    async fn execute_read_only(&self, sql: &str) -> StoreResult<Vec<QueryRow>>;
}

#[derive(Clone)]
pub struct DatasetStore {
    db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct TableDdl {
    name: String,
    sql: String,
}

#[derive(Debug, FromQueryResult)]
struct ColumnName {
    name: String,
}

impl DatasetStore {
    pub async fn connect(cfg: &DatabaseConfig) -> StoreResult<Self> {
        let db = connection::connect(cfg).await?;
        Ok(Self { db })
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates any missing table from the registered entities. Existing tables are left alone.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        info!("syncing dataset schema from entities");
        self.db
            .get_schema_registry("churn_analyst::db::entities::*")
            .sync(&self.db)
            .await
            .map_err(|err| StoreError::storage_unavailable(err.to_string()))
    }

    /// Writes that must land together go through one of these.
    pub async fn begin(&self) -> StoreResult<DatabaseTransaction> {
        Ok(self.db.begin().await?)
    }

    pub async fn table_names(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .table_ddl()
            .await?
            .into_iter()
            .map(|table| table.name)
            .collect())
    }

    async fn table_ddl(&self) -> StoreResult<Vec<TableDdl>> {
        let stmt = Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name, sql FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        );
        Ok(TableDdl::find_by_statement(stmt).all(&self.db).await?)
    }

    async fn column_names(&self, table: &str) -> StoreResult<Vec<String>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT name FROM pragma_table_info(?) ORDER BY cid",
            [table.into()],
        );
        Ok(ColumnName::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|column| column.name)
            .collect())
    }

    async fn sample_rows(&self, table: &str) -> StoreResult<Vec<QueryRow>> {
        let stmt = Statement::from_string(
            DbBackend::Sqlite,
            format!("SELECT * FROM \"{table}\" LIMIT {SAMPLE_ROWS}"),
        );
        self.fetch_rows(stmt).await
    }

    async fn fetch_rows(&self, stmt: Statement) -> StoreResult<Vec<QueryRow>> {
        let results = self.db.query_all_raw(stmt).await?;
        Ok(results.iter().map(decode_row).collect())
    }
}

#[async_trait]
impl QueryStore for DatasetStore {
    async fn table_info(&self) -> StoreResult<String> {
        let mut sections = Vec::new();
        for table in self.table_ddl().await? {
            let columns = self.column_names(&table.name).await?;
            let rows = self.sample_rows(&table.name).await?;
            sections.push(render_table_section(&table.name, &table.sql, &columns, &rows));
        }
        Ok(sections.join("\n\n"))
    }

    async fn execute_read_only(&self, sql: &str) -> StoreResult<Vec<QueryRow>> {
        let sql = sql_guard::ensure_read_only(sql)?;
        debug!(%sql, "executing read-only query");
        let rows = self
            .fetch_rows(Statement::from_string(DbBackend::Sqlite, sql))
            .await?;
        debug!(rows = rows.len(), "read-only query finished");
        Ok(rows)
    }
}

fn render_table_section(name: &str, ddl: &str, columns: &[String], rows: &[QueryRow]) -> String {
    let mut lines = vec![ddl.trim().to_string(), String::new(), "/*".to_string()];
    lines.push(format!("{} rows from {name} table:", rows.len()));
    lines.push(columns.join("\t"));
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| render_cell(row.get(column)))
            .collect();
        lines.push(cells.join("\t"));
    }
    lines.push("*/".to_string());
    lines.join("\n")
}

fn render_cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => "None".to_string(),
        Some(JsonValue::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Expression columns such as `COUNT(*)` carry no declared type, so every cell is
/// decoded from the value SQLite actually returned.
fn decode_row(result: &QueryResult) -> QueryRow {
    result
        .column_names()
        .into_iter()
        .map(|column| {
            let value = decode_cell(result, &column);
            (column, value)
        })
        .collect()
}

fn decode_cell(result: &QueryResult, column: &str) -> JsonValue {
    if let Ok(value) = result.try_get_by::<Option<i64>, _>(column) {
        return value.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(value) = result.try_get_by::<Option<f64>, _>(column) {
        return value.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(value) = result.try_get_by::<Option<String>, _>(column) {
        return value.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(value) = result.try_get_by::<Option<NaiveDate>, _>(column) {
        return value.map_or(JsonValue::Null, |date| JsonValue::from(date.to_string()));
    }
    if let Ok(value) = result.try_get_by::<Option<Vec<u8>>, _>(column) {
        return value.map_or(JsonValue::Null, |bytes| {
            JsonValue::from(String::from_utf8_lossy(&bytes).into_owned())
        });
    }
    debug!(column, "undecodable column value");
    JsonValue::Null
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{QueryRow, render_cell, render_table_section};

    #[test]
    fn renders_schema_section_with_sample_rows() {
        let mut row = QueryRow::new();
        row.insert("customer_id".to_string(), json!(1));
        row.insert("name".to_string(), json!("Company 1"));
        row.insert("email".to_string(), json!(null));

        let section = render_table_section(
            "customers",
            "CREATE TABLE customers (customer_id integer PRIMARY KEY)",
            &[
                "customer_id".to_string(),
                "name".to_string(),
                "email".to_string(),
            ],
            &[row],
        );

        assert_eq!(
            section,
            "CREATE TABLE customers (customer_id integer PRIMARY KEY)\n\n/*\n\
             1 rows from customers table:\ncustomer_id\tname\temail\n1\tCompany 1\tNone\n*/"
        );
    }

    #[test]
    fn renders_cells_without_json_quoting() {
        assert_eq!(render_cell(Some(&json!("Active"))), "Active");
        assert_eq!(render_cell(Some(&json!(99.0))), "99.0");
        assert_eq!(render_cell(None), "None");
    }
}
