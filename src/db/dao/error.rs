use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("only read-only SELECT statements may run ({reason})")]
    NotReadOnly { reason: String },
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    pub fn not_read_only(reason: impl Into<String>) -> Self {
        Self::NotReadOnly {
            reason: reason.into(),
        }
    }
}
