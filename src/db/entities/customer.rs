use sea_orm::entity::prelude::*;

use crate::db::dao::UpsertTarget;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub customer_id: i32,
    pub name: String,
    pub email: String,
    pub signup_date: Date,
    pub industry: String,
    pub company_size: String,
    #[sea_orm(has_many)]
    pub subscriptions: HasMany<super::subscription::Entity>,
    #[sea_orm(has_many)]
    pub usage_metrics: HasMany<super::usage_metric::Entity>,
    #[sea_orm(has_many)]
    pub churn_events: HasMany<super::churn_event::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

impl UpsertTarget for Entity {
    fn conflict_column() -> Column {
        Column::CustomerId
    }

    fn update_columns() -> Vec<Column> {
        vec![
            Column::Name,
            Column::Email,
            Column::SignupDate,
            Column::Industry,
            Column::CompanySize,
        ]
    }
}
