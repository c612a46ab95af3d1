use crate::traits::Collector;
use crate::types::{Document, Result, RetryConfig};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff<backoff::SystemClock> {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.initial_delay.saturating_mul(1 << self.max_retries.min(16)),
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Run a collector up to `max_retries` times (at least once), doubling the
/// pause after each error. A successful result, empty or not, is returned
/// as is. Exhausted retries yield an empty list. A non-retryable error
/// ends the loop and is returned.
pub async fn collect_with_retry(collector: &mut dyn Collector, policy: &RetryPolicy) -> Result<Vec<Document>> {
    let attempts = policy.max_retries.max(1);
    let mut backoff = policy.backoff();
    let name = collector.source_name();

    for attempt in 1..=attempts {
        match collector.collect().await {
            Ok(documents) => {
                info!("{}: attempt {} returned {} documents", name, attempt, documents.len());
                return Ok(documents);
            }
            Err(e) if !e.is_retryable() => {
                error!("{}: attempt {} failed and cannot be retried: {}", name, attempt, e);
                return Err(e);
            }
            Err(e) => {
                if attempt == attempts {
                    error!("{}: attempt {}/{} failed, giving up: {}", name, attempt, attempts, e);
                    break;
                }
                let delay = backoff.next_backoff().unwrap_or(policy.initial_delay);
                warn!("{}: attempt {}/{} failed, retrying in {:?}: {}", name, attempt, attempts, delay, e);
                tokio::time::sleep(delay).await;
            }
        }
    }

    Ok(Vec::new())
}
