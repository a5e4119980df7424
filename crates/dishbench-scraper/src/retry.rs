//! Backoff for the replayed search API call.
//!
//! Replays fail fast by default (`max_retries = 0`); when retries are
//! configured, only throttling, 5xx, timeouts and connection failures are
//! repeated. Parse errors and 4xx responses come back the same on every
//! attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_SECS: u64 = 60;

fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Delay before retry number `attempt` (1-based). A `Retry-After` hint
/// replaces the exponential schedule; either way the wait is capped at
/// 60 seconds.
fn backoff_delay(err: &ScraperError, attempt: u32, backoff_base_secs: u64) -> Duration {
    let secs = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => *retry_after_secs,
        _ => backoff_base_secs.saturating_mul(1u64 << attempt.saturating_sub(1).min(10)),
    };
    Duration::from_secs(secs.min(MAX_DELAY_SECS))
}

/// Runs `operation`, retrying transient failures up to `max_retries` extra
/// times. The n-th retry waits `backoff_base_secs * 2^(n-1)` seconds, or the
/// server's `Retry-After` when throttled.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        attempt += 1;
        let delay = backoff_delay(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs = delay.as_secs(),
            error = %err,
            "replay failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}
