//! Retry logic for vendor API calls with exponential backoff.
//!
//! Airtable rate-limits at 5 requests per second per base and answers 429 when
//! exceeded; Mistral occasionally answers 5xx under load. Both clients wrap
//! their requests in [`retry`], which only retries errors for which
//! [`AppError::is_retryable`] holds.

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Retry strategy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 disables retries)
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Whether to add jitter to delays
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::network()
    }
}

impl RetryConfig {
    /// Config for HTTP calls to Airtable and Mistral.
    pub fn network() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            add_jitter: true,
        }
    }

    /// Single attempt, used by tests and health probes.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            add_jitter: false,
        }
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub fn max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// Sets the initial delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Disables jitter.
    #[must_use]
    pub fn no_jitter(mut self) -> Self {
        self.add_jitter = false;
        self
    }

    fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(self.max_delay.max(self.initial_delay))
            .with_max_times(self.max_retries);

        if self.add_jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Runs `operation`, retrying transient failures according to `config`.
///
/// # Arguments
/// * `config` - Backoff settings
/// * `name` - Operation name used in retry log events
/// * `operation` - Factory producing a fresh future per attempt
pub async fn retry<T, F, Fut>(config: &RetryConfig, name: &str, operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    operation
        .retry(config.backoff())
        .when(AppError::is_retryable)
        .notify(|err: &AppError, delay: Duration| {
            tracing::warn!(
                operation = name,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "retrying after transient error"
            );
        })
        .await
}
