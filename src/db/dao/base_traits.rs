/// Tables that can be written with `INSERT .. ON CONFLICT(pk) DO UPDATE`.
pub trait UpsertTarget: sea_orm::EntityTrait {
    fn conflict_column() -> Self::Column;

    /// Every non-key column; these are overwritten when the key already exists.
    fn update_columns() -> Vec<Self::Column>;
}
