use sea_orm::entity::prelude::*;

use crate::db::dao::UpsertTarget;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "churn_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub churn_id: i32,
    #[sea_orm(indexed)]
    pub customer_id: i32,
    pub churn_date: Date,
    pub churn_reason: String,
    #[sea_orm(belongs_to, from = "customer_id", to = "customer_id")]
    pub customer: HasOne<super::customer::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl UpsertTarget for Entity {
    fn conflict_column() -> Column {
        Column::ChurnId
    }

    fn update_columns() -> Vec<Column> {
        vec![Column::CustomerId, Column::ChurnDate, Column::ChurnReason]
    }
}
