use anyhow::{Result, bail};

use super::{AppConfig, GeneratorConfig, UsageRange, defaults};

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    let database = &cfg.database;
    if database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    } else if !database.url.trim().to_ascii_lowercase().starts_with("sqlite:") {
        errors.push("database.url must use the sqlite: scheme".to_string());
    }

    if database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if database.min_idle > database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            database.min_idle, database.max_connections
        ));
    }

    errors.extend(generator_errors(&cfg.generator));

    if let Some(translator) = cfg.translator.as_ref() {
        if translator.api_key.trim().is_empty() {
            errors.push("translator.api_key must not be empty".to_string());
        }

        if translator.model.trim().is_empty() {
            errors.push("translator.model must not be empty".to_string());
        }

        if translator.timeout_secs == 0 {
            errors.push("translator.timeout_secs must be > 0".to_string());
        }

        if translator.max_tokens == 0 {
            errors.push("translator.max_tokens must be > 0".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

/// Checks shared by config loading and the generator itself.
pub fn generator_errors(cfg: &GeneratorConfig) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.customer_count == 0 || i64::from(cfg.customer_count) > defaults::MAX_CUSTOMER_COUNT {
        errors.push(format!(
            "generator.customer_count ({}) must be within 1..={}",
            cfg.customer_count,
            defaults::MAX_CUSTOMER_COUNT
        ));
    }

    if cfg.usage_window_days == 0
        || i64::from(cfg.usage_window_days) > defaults::MAX_USAGE_WINDOW_DAYS
    {
        errors.push(format!(
            "generator.usage_window_days ({}) must be within 1..={}",
            cfg.usage_window_days,
            defaults::MAX_USAGE_WINDOW_DAYS
        ));
    }

    if !(0.0..=1.0).contains(&cfg.churn_fraction) {
        errors.push(format!(
            "generator.churn_fraction ({}) must be within 0.0..=1.0",
            cfg.churn_fraction
        ));
    }

    if cfg.degraded_window_days == 0 {
        errors.push("generator.degraded_window_days must be > 0".to_string());
    }

    if cfg.churn_lookback_days == 0 {
        errors.push("generator.churn_lookback_days must be > 0".to_string());
    }

    if cfg.churn_lookback_days > cfg.signup_min_days_ago {
        errors.push(format!(
            "generator.churn_lookback_days ({}) must be <= generator.signup_min_days_ago ({})",
            cfg.churn_lookback_days, cfg.signup_min_days_ago
        ));
    }

    if cfg.signup_min_days_ago > cfg.signup_max_days_ago {
        errors.push(format!(
            "generator.signup_min_days_ago ({}) must be <= generator.signup_max_days_ago ({})",
            cfg.signup_min_days_ago, cfg.signup_max_days_ago
        ));
    }

    for (name, range) in [
        ("healthy.logins", cfg.healthy.logins),
        ("healthy.feature_usage", cfg.healthy.feature_usage),
        ("healthy.support_tickets", cfg.healthy.support_tickets),
        ("degraded.logins", cfg.degraded.logins),
        ("degraded.feature_usage", cfg.degraded.feature_usage),
        ("degraded.support_tickets", cfg.degraded.support_tickets),
    ] {
        if let Some(err) = range_error(name, range) {
            errors.push(err);
        }
    }

    if cfg.degraded.logins.max >= cfg.healthy.logins.min {
        errors.push(
            "generator.degraded.logins.max must be below generator.healthy.logins.min".to_string(),
        );
    }

    if cfg.degraded.feature_usage.max >= cfg.healthy.feature_usage.min {
        errors.push(
            "generator.degraded.feature_usage.max must be below generator.healthy.feature_usage.min"
                .to_string(),
        );
    }

    if cfg.degraded.support_tickets.min <= cfg.healthy.support_tickets.max {
        errors.push(
            "generator.degraded.support_tickets.min must be above generator.healthy.support_tickets.max"
                .to_string(),
        );
    }

    errors
}

fn range_error(name: &str, range: UsageRange) -> Option<String> {
    if range.min < 0 {
        return Some(format!("generator.{name}.min ({}) must be >= 0", range.min));
    }
    if range.min > range.max {
        return Some(format!(
            "generator.{name}.min ({}) must be <= generator.{name}.max ({})",
            range.min, range.max
        ));
    }
    None
}
