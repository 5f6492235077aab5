//! Bounded retry with fixed backoff for sink and store calls

use backon::{ConstantBuilder, Retryable};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Fixed-delay retry policy: `retries` additional attempts spaced `delay` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: usize, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.retries)
    }

    /// Run `op` until it succeeds or the policy is exhausted, returning the last error.
    pub async fn run<T, E, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        op.retry(self.backoff())
            .notify(|err: &E, delay: Duration| {
                warn!(
                    operation,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after failure: {}",
                    err
                );
            })
            .await
    }
}
