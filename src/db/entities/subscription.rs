use sea_orm::entity::prelude::*;

use crate::db::dao::UpsertTarget;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub subscription_id: i32,
    #[sea_orm(indexed)]
    pub customer_id: i32,
    pub plan_type: String,
    pub mrr: f64,
    pub start_date: Date,
    /// Set exactly when `status` is `Cancelled`.
    pub end_date: Option<Date>,
    pub status: String,
    #[sea_orm(belongs_to, from = "customer_id", to = "customer_id")]
    pub customer: HasOne<super::customer::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl UpsertTarget for Entity {
    fn conflict_column() -> Column {
        Column::SubscriptionId
    }

    fn update_columns() -> Vec<Column> {
        vec![
            Column::CustomerId,
            Column::PlanType,
            Column::Mrr,
            Column::StartDate,
            Column::EndDate,
            Column::Status,
        ]
    }
}
