pub const DEFAULT_RUST_LOG: &str = "info,sqlx=warn";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://business_data.db?mode=rwc";
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 4;
pub const DEFAULT_DB_MIN_IDLE: i64 = 1;

pub const DEFAULT_CUSTOMER_COUNT: i64 = 100;
pub const DEFAULT_USAGE_WINDOW_DAYS: i64 = 60;
pub const DEFAULT_CHURN_FRACTION: f64 = 0.20;
pub const DEFAULT_DEGRADED_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CHURN_LOOKBACK_DAYS: i64 = 30;
pub const DEFAULT_SIGNUP_MIN_DAYS_AGO: i64 = 180;
pub const DEFAULT_SIGNUP_MAX_DAYS_AGO: i64 = 730;

pub const HEALTHY_LOGINS: (i32, i32) = (5, 20);
pub const HEALTHY_FEATURE_USAGE: (i32, i32) = (20, 100);
pub const HEALTHY_SUPPORT_TICKETS: (i32, i32) = (0, 1);
pub const DEGRADED_LOGINS: (i32, i32) = (0, 2);
pub const DEGRADED_FEATURE_USAGE: (i32, i32) = (0, 5);
pub const DEGRADED_SUPPORT_TICKETS: (i32, i32) = (2, 4);

pub const MAX_CUSTOMER_COUNT: i64 = 1_000_000;

/// Metric ids are `customer_id * 1000 + days_ago`, so the window must stay below this.
pub const MAX_USAGE_WINDOW_DAYS: i64 = 999;

pub const DEFAULT_TRANSLATOR_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_TRANSLATOR_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_TRANSLATOR_TIMEOUT_SECS: i64 = 60;
pub const DEFAULT_TRANSLATOR_MAX_TOKENS: i64 = 1024;
