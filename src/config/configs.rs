use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::gateway::TranslatorProviderId;

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub generator: GeneratorConfig,
    pub translator: Option<TranslatorConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_idle: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::DEFAULT_DATABASE_URL.to_string(),
            max_connections: defaults::DEFAULT_DB_MAX_CONNECTIONS as u32,
            min_idle: defaults::DEFAULT_DB_MIN_IDLE as u32,
        }
    }
}

impl DatabaseConfig {
    pub fn sqlite_file(path: &std::path::Path) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            ..Self::default()
        }
    }
}

/// Inclusive bounds for one randomized usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UsageRange {
    pub min: i32,
    pub max: i32,
}

impl UsageRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl From<(i32, i32)> for UsageRange {
    fn from((min, max): (i32, i32)) -> Self {
        Self::new(min, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UsageProfile {
    pub logins: UsageRange,
    pub feature_usage: UsageRange,
    pub support_tickets: UsageRange,
}

impl UsageProfile {
    pub fn healthy() -> Self {
        Self {
            logins: defaults::HEALTHY_LOGINS.into(),
            feature_usage: defaults::HEALTHY_FEATURE_USAGE.into(),
            support_tickets: defaults::HEALTHY_SUPPORT_TICKETS.into(),
        }
    }

    pub fn degraded() -> Self {
        Self {
            logins: defaults::DEGRADED_LOGINS.into(),
            feature_usage: defaults::DEGRADED_FEATURE_USAGE.into(),
            support_tickets: defaults::DEGRADED_SUPPORT_TICKETS.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub customer_count: u32,
    pub usage_window_days: u32,
    pub churn_fraction: f64,
    pub degraded_window_days: u32,
    pub churn_lookback_days: u32,
    pub signup_min_days_ago: u32,
    pub signup_max_days_ago: u32,
    pub healthy: UsageProfile,
    pub degraded: UsageProfile,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            customer_count: defaults::DEFAULT_CUSTOMER_COUNT as u32,
            usage_window_days: defaults::DEFAULT_USAGE_WINDOW_DAYS as u32,
            churn_fraction: defaults::DEFAULT_CHURN_FRACTION,
            degraded_window_days: defaults::DEFAULT_DEGRADED_WINDOW_DAYS as u32,
            churn_lookback_days: defaults::DEFAULT_CHURN_LOOKBACK_DAYS as u32,
            signup_min_days_ago: defaults::DEFAULT_SIGNUP_MIN_DAYS_AGO as u32,
            signup_max_days_ago: defaults::DEFAULT_SIGNUP_MAX_DAYS_AGO as u32,
            healthy: UsageProfile::healthy(),
            degraded: UsageProfile::degraded(),
        }
    }
}

impl GeneratorConfig {
    /// Size of the cancelled prefix `[1, n]` of the customer id space.
    pub fn cancelled_count(&self) -> u32 {
        (f64::from(self.customer_count) * self.churn_fraction).floor() as u32
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    #[serde(default = "default_translator_provider")]
    pub provider: TranslatorProviderId,
    pub api_key: String,
    #[serde(default = "default_translator_model")]
    pub model: String,
    #[serde(default = "default_translator_base_url")]
    pub base_url: String,
    #[serde(default = "default_translator_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_translator_max_tokens")]
    pub max_tokens: u32,
}

fn default_translator_provider() -> TranslatorProviderId {
    TranslatorProviderId::Anthropic
}

fn default_translator_model() -> String {
    defaults::DEFAULT_TRANSLATOR_MODEL.to_string()
}

fn default_translator_base_url() -> String {
    defaults::DEFAULT_TRANSLATOR_BASE_URL.to_string()
}

fn default_translator_timeout_secs() -> u64 {
    defaults::DEFAULT_TRANSLATOR_TIMEOUT_SECS as u64
}

fn default_translator_max_tokens() -> u32 {
    defaults::DEFAULT_TRANSLATOR_MAX_TOKENS as u32
}
