//! Pipeline sizing and timing knobs.

use std::str::FromStr;
use std::time::Duration;

/// Startup configuration for an [`OrderSystem`](crate::system::OrderSystem).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of consumer workers sharing the queue.
    pub workers: usize,
    /// Capacity bound of the order queue.
    pub queue_capacity: usize,
    /// Concurrency bound of the payment task pool, sized independently of
    /// the workers since gateway calls are I/O-bound.
    pub payment_concurrency: usize,
    /// Hard ceiling on a single payment await.
    pub payment_timeout: Duration,
    /// How long shutdown waits for each worker to finish.
    pub join_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 32,
            payment_concurrency: 8,
            payment_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    /// Builds a config from the environment, falling back to defaults for
    /// anything unset or unparsable:
    ///
    /// - `ORDER_WORKERS`
    /// - `ORDER_QUEUE_CAPACITY`
    /// - `PAYMENT_POOL_SIZE`
    /// - `PAYMENT_TIMEOUT_MS`
    /// - `WORKER_JOIN_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            workers: env_or("ORDER_WORKERS", defaults.workers),
            queue_capacity: env_or("ORDER_QUEUE_CAPACITY", defaults.queue_capacity),
            payment_concurrency: env_or("PAYMENT_POOL_SIZE", defaults.payment_concurrency),
            payment_timeout: Duration::from_millis(env_or(
                "PAYMENT_TIMEOUT_MS",
                defaults.payment_timeout.as_millis() as u64,
            )),
            join_timeout: Duration::from_millis(env_or(
                "WORKER_JOIN_TIMEOUT_MS",
                defaults.join_timeout.as_millis() as u64,
            )),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
