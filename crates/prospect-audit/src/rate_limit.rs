//! Outbound courtesy and retry utilities.
//!
//! [`HostThrottle`] spaces requests to the same host by a fixed minimum delay.
//! [`retry_with_backoff`] re-runs a fetch on transient failures; the pipeline
//! uses it with a single retry for each business website.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::fetch::FetchResult;

/// Per-host minimum spacing between request starts.
///
/// Each caller reserves the next free slot for its host under a short-lived
/// lock, then sleeps outside the lock until that slot arrives.
#[derive(Debug)]
pub struct HostThrottle {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `host` may start.
    pub async fn wait(&self, host: &str) {
        if self.delay.is_zero() {
            return;
        }

        let key = host.to_ascii_lowercase();
        let wait = {
            let mut slots = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            // A slot in the past is the same as no entry.
            slots.retain(|_, next| *next > now);
            let slot = slots.get(&key).copied().unwrap_or(now);
            slots.insert(key, slot + self.delay);
            slot - now
        };

        if !wait.is_zero() {
            tracing::trace!(host, wait_ms = wait.as_millis(), "courtesy delay");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Executes `operation`, retrying on transient failures.
///
/// Success is returned immediately. A retriable [`crate::FetchFailure`] sleeps
/// `backoff * 2^attempt` and tries again, up to `max_retries` additional
/// attempts; the last failure is returned once they are exhausted.
/// Non-retriable failures are returned without sleeping.
pub(crate) async fn retry_with_backoff<F, Fut>(
    max_retries: u32,
    backoff: Duration,
    mut operation: F,
) -> FetchResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult>,
{
    let mut attempt = 0u32;

    loop {
        let failure = match operation().await {
            FetchResult::Failure(failure) => failure,
            success @ FetchResult::Success(_) => return success,
        };
        if !failure.is_retriable() || attempt >= max_retries {
            return FetchResult::Failure(failure);
        }

        let delay = backoff.saturating_mul(1u32 << attempt.min(16));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = delay.as_millis(),
            error = %failure,
            "transient fetch failure, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
