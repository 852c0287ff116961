// src/util/retry.rs
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use tracing::warn;

/// Bounded exponential backoff with jitter, shared by every network-facing
/// service (enrichment, note store, completion marking).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Run `op`, retrying transient errors until the attempt budget is spent.
    /// Permanent errors surface immediately.
    pub fn run<T, E, F>(&self, what: &str, is_transient: impl Fn(&E) -> bool, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: std::fmt::Display,
    {
        let schedule = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.5)
            .with_max_elapsed_time(None)
            .build();

        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        backoff::retry(schedule, || {
            attempt += 1;
            op().map_err(|err| {
                if attempt < max_attempts && is_transient(&err) {
                    warn!(%err, attempt, "{what} failed, retrying");
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
        })
        .map_err(|err| match err {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}
