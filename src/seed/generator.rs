use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeDelta, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use super::catalog::{ChurnReason, CompanySize, Industry, PlanTier, SubscriptionStatus};
use crate::{
    config::{GeneratorConfig, UsageProfile, UsageRange, validate::generator_errors},
    db::{
        DatasetStore, StoreError,
        dao::{clear_rows, upsert_rows},
        entities::{
            churn_event, customer,
            prelude::{ChurnEvent, Customer, Subscription, UsageMetric},
            subscription, usage_metric,
        },
    },
};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid generator config:\n- {}", .0.join("\n- "))]
    InvalidConfig(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One consistent snapshot of all four tables.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub generated_on: NaiveDate,
    pub customers: Vec<customer::Model>,
    pub subscriptions: Vec<subscription::Model>,
    pub usage_metrics: Vec<usage_metric::Model>,
    pub churn_events: Vec<churn_event::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub generated_on: NaiveDate,
    pub customers: u64,
    pub subscriptions: u64,
    pub usage_metrics: u64,
    pub churn_events: u64,
    pub cancelled_customer_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct DatasetGenerator {
    cfg: GeneratorConfig,
}

impl DatasetGenerator {
    pub fn new(cfg: GeneratorConfig) -> Result<Self, GenerateError> {
        let errors = generator_errors(&cfg);
        if !errors.is_empty() {
            return Err(GenerateError::InvalidConfig(errors));
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.cfg
    }

    /// Builds a fresh snapshot dated today and upserts it into `store`.
    pub async fn generate(&self, store: &DatasetStore) -> Result<GenerationSummary, GenerateError> {
        let mut rng = StdRng::from_entropy();
        let dataset = self.build(&mut rng, Utc::now().date_naive());
        Ok(dataset.persist(store).await?)
    }

    /// Structure is fixed by the config; only field values come from `rng`.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R, today: NaiveDate) -> Dataset {
        let cfg = &self.cfg;
        let customer_count = cfg.customer_count as i32;
        let cancelled_count = cfg.cancelled_count() as i32;
        let window = i64::from(cfg.usage_window_days);

        let mut dataset = Dataset {
            generated_on: today,
            customers: Vec::with_capacity(customer_count as usize),
            subscriptions: Vec::with_capacity(customer_count as usize),
            usage_metrics: Vec::with_capacity(customer_count as usize * window as usize),
            churn_events: Vec::with_capacity(cancelled_count as usize),
        };

        for customer_id in 1..=customer_count {
            let cancelled = customer_id <= cancelled_count;
            let signup_date = days_ago(
                today,
                rng.gen_range(cfg.signup_min_days_ago..=cfg.signup_max_days_ago),
            );

            dataset.customers.push(customer::Model {
                customer_id,
                name: format!("Company {customer_id}"),
                email: format!("contact{customer_id}@company{customer_id}.com"),
                signup_date,
                industry: Industry::pick(rng).to_string(),
                company_size: CompanySize::pick(rng).to_string(),
            });

            let churn_date =
                cancelled.then(|| days_ago(today, rng.gen_range(1..=cfg.churn_lookback_days)));
            let plan = PlanTier::pick(rng);
            let status = if cancelled {
                SubscriptionStatus::Cancelled
            } else {
                SubscriptionStatus::Active
            };

            dataset.subscriptions.push(subscription::Model {
                subscription_id: customer_id,
                customer_id,
                plan_type: plan.to_string(),
                mrr: plan.mrr(),
                start_date: signup_date,
                end_date: churn_date,
                status: status.to_string(),
            });

            if let Some(churn_date) = churn_date {
                dataset.churn_events.push(churn_event::Model {
                    churn_id: customer_id,
                    customer_id,
                    churn_date,
                    churn_reason: ChurnReason::pick(rng).to_string(),
                });
            }

            for offset in 0..cfg.usage_window_days {
                let profile = self.profile_for(cancelled, offset);
                dataset.usage_metrics.push(usage_metric::Model {
                    metric_id: i64::from(customer_id) * 1000 + i64::from(offset),
                    customer_id,
                    date: days_ago(today, offset),
                    logins: draw(rng, profile.logins),
                    feature_usage: draw(rng, profile.feature_usage),
                    support_tickets: draw(rng, profile.support_tickets),
                });
            }
        }

        dataset
    }

    fn profile_for(&self, cancelled: bool, offset: u32) -> &UsageProfile {
        if cancelled && offset < self.cfg.degraded_window_days {
            &self.cfg.degraded
        } else {
            &self.cfg.healthy
        }
    }
}

impl Dataset {
    pub fn cancelled_customer_ids(&self) -> BTreeSet<i32> {
        let cancelled = SubscriptionStatus::Cancelled.as_str();
        self.subscriptions
            .iter()
            .filter(|subscription| subscription.status == cancelled)
            .map(|subscription| subscription.customer_id)
            .collect()
    }

    /// Replaces whatever the store held with this snapshot in one transaction.
    ///
    /// Children are cleared before parents and written after them so foreign keys
    /// always resolve.
    pub async fn persist(self, store: &DatasetStore) -> Result<GenerationSummary, StoreError> {
        let cancelled_customer_ids: Vec<i32> =
            self.cancelled_customer_ids().into_iter().collect();

        let txn = store.begin().await?;
        clear_rows::<ChurnEvent, _>(&txn).await?;
        clear_rows::<UsageMetric, _>(&txn).await?;
        clear_rows::<Subscription, _>(&txn).await?;
        clear_rows::<Customer, _>(&txn).await?;

        let customers = upsert_rows::<Customer, _>(&txn, self.customers).await?;
        let subscriptions = upsert_rows::<Subscription, _>(&txn, self.subscriptions).await?;
        let usage_metrics = upsert_rows::<UsageMetric, _>(&txn, self.usage_metrics).await?;
        let churn_events = upsert_rows::<ChurnEvent, _>(&txn, self.churn_events).await?;
        txn.commit().await?;

        let summary = GenerationSummary {
            generated_on: self.generated_on,
            customers,
            subscriptions,
            usage_metrics,
            churn_events,
            cancelled_customer_ids,
        };
        info!(
            customers = summary.customers,
            subscriptions = summary.subscriptions,
            usage_metrics = summary.usage_metrics,
            churn_events = summary.churn_events,
            cancelled = summary.cancelled_customer_ids.len(),
            "business dataset generated"
        );
        Ok(summary)
    }
}

fn days_ago(today: NaiveDate, days: u32) -> NaiveDate {
    today - TimeDelta::days(i64::from(days))
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: UsageRange) -> i32 {
    rng.gen_range(range.min..=range.max)
}
