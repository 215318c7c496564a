#[allow(unused_imports)]
pub mod prelude {
    pub use super::churn_event::Entity as ChurnEvent;
    pub use super::customer::Entity as Customer;
    pub use super::subscription::Entity as Subscription;
    pub use super::usage_metric::Entity as UsageMetric;
}

pub mod churn_event;
pub mod customer;
pub mod subscription;
pub mod usage_metric;

/// Table names in dependency order: parents before children.
pub const TABLES: [&str; 4] = ["customers", "subscriptions", "usage_metrics", "churn_events"];
