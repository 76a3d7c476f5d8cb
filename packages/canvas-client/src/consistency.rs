//! Read-after-write consistency.
//!
//! The external indexing layer lags mutations by a bounded, unspecified
//! amount. Every mutating flow funnels through `refetch_settled`: refetch
//! with exponential backoff until the expected post-state is observed or
//! the policy is exhausted, instead of scattering fixed sleeps per call
//! site.

use crate::config::SettleConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct SettlePolicy {
    /// Upper bound on a single backoff delay.
    pub settle_delay: Duration,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Refetch attempts after the initial read.
    pub max_retries: u32,
}

impl SettlePolicy {
    pub fn from_config(config: &SettleConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_retries: config.max_retries,
        }
    }

    /// Backoff before retry `attempt` (0-indexed), capped at the lag bound.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        exp.min(self.settle_delay)
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self::from_config(&SettleConfig::default())
    }
}

/// Refetch until `settled` holds. Returns as soon as it does; after the
/// attempts are exhausted the last observed value is returned anyway —
/// lag beyond the bound is tolerated, not fatal — with a warning logged.
pub async fn refetch_settled<T, F, Fut, P>(
    policy: &SettlePolicy,
    mut fetch: F,
    settled: P,
) -> Result<T, crate::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, crate::Error>>,
    P: Fn(&T) -> bool,
{
    let mut value = fetch().await?;
    if settled(&value) {
        return Ok(value);
    }
    for attempt in 0..policy.max_retries {
        tokio::time::sleep(policy.retry_delay(attempt)).await;
        value = fetch().await?;
        if settled(&value) {
            return Ok(value);
        }
    }
    warn!(
        retries = policy.max_retries,
        "State did not settle within policy; returning last observed value"
    );
    Ok(value)
}
