use sea_orm::entity::prelude::*;

use crate::db::dao::UpsertTarget;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_metrics")]
pub struct Model {
    /// `customer_id * 1000 + days_ago`
    #[sea_orm(primary_key, auto_increment = false)]
    pub metric_id: i64,
    #[sea_orm(indexed)]
    pub customer_id: i32,
    pub date: Date,
    pub logins: i32,
    pub feature_usage: i32,
    pub support_tickets: i32,
    #[sea_orm(belongs_to, from = "customer_id", to = "customer_id")]
    pub customer: HasOne<super::customer::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl UpsertTarget for Entity {
    fn conflict_column() -> Column {
        Column::MetricId
    }

    fn update_columns() -> Vec<Column> {
        vec![
            Column::CustomerId,
            Column::Date,
            Column::Logins,
            Column::FeatureUsage,
            Column::SupportTickets,
        ]
    }
}
