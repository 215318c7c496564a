use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityName, EntityTrait, IntoActiveModel};
use tracing::debug;

use super::base_traits::UpsertTarget;
use super::error::StoreResult;

/// SQLite caps bound variables per statement; the widest table has seven columns.
pub const UPSERT_CHUNK_ROWS: usize = 500;

/// Inserts `rows`, overwriting any row whose primary key already exists.
///
/// Writes happen in chunks of [`UPSERT_CHUNK_ROWS`]. Returns the number of rows
/// the database reported as affected.
pub async fn upsert_rows<E, C>(db: &C, rows: Vec<E::Model>) -> StoreResult<u64>
where
    C: ConnectionTrait,
    E: UpsertTarget,
    E::Model: IntoActiveModel<E::ActiveModel> + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
{
    let table = E::default().table_name();
    let mut affected = 0u64;
    let mut rows = rows.into_iter().peekable();

    while rows.peek().is_some() {
        let chunk: Vec<E::ActiveModel> = rows
            .by_ref()
            .take(UPSERT_CHUNK_ROWS)
            .map(IntoActiveModel::into_active_model)
            .collect();
        let on_conflict = OnConflict::column(E::conflict_column())
            .update_columns(E::update_columns())
            .to_owned();

        affected += E::insert_many(chunk)
            .on_conflict(on_conflict)
            .exec_without_returning(db)
            .await?;
    }

    debug!(table, rows = affected, "upserted rows");
    Ok(affected)
}

/// Deletes every row of `E`. Children must be cleared before their parents.
pub async fn clear_rows<E, C>(db: &C) -> StoreResult<u64>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let table = E::default().table_name();
    let removed = E::delete_many().exec(db).await?.rows_affected;
    debug!(table, rows = removed, "cleared rows");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    use super::{clear_rows, upsert_rows};
    use crate::db::dao::StoreError;
    use crate::db::entities::{churn_event, prelude::ChurnEvent};

    fn event(id: i32) -> churn_event::Model {
        churn_event::Model {
            churn_id: id,
            customer_id: id,
            churn_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("date should be valid"),
            churn_reason: "Poor support".to_string(),
        }
    }

    #[tokio::test]
    async fn skips_the_database_when_there_is_nothing_to_write() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let affected = upsert_rows::<ChurnEvent, _>(&db, Vec::new())
            .await
            .expect("empty upsert should succeed");

        assert_eq!(affected, 0);
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn writes_large_batches_in_chunks() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 500,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let rows = (1..=501).map(event).collect();

        let affected = upsert_rows::<ChurnEvent, _>(&db, rows)
            .await
            .expect("upsert should succeed");

        assert_eq!(affected, 501);
        assert_eq!(db.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_errors([DbErr::Custom("disk full".to_string())])
            .into_connection();

        let err = upsert_rows::<ChurnEvent, _>(&db, vec![event(1)])
            .await
            .expect_err("upsert should fail");

        assert!(matches!(err, StoreError::Db(_)));
    }

    #[tokio::test]
    async fn clears_a_table_in_one_statement() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 5,
            }])
            .into_connection();

        let removed = clear_rows::<ChurnEvent, _>(&db)
            .await
            .expect("clear should succeed");

        assert_eq!(removed, 5);
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(format!("{log:?}").contains("DELETE FROM"));
    }
}
