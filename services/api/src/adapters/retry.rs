//! services/api/src/adapters/retry.rs
//!
//! Bounded retry with exponential backoff for transient upstream failures.
//! Used by the AI adapters; nothing else in the service retries
//! automatically.

use std::future::Future;
use std::time::Duration;
use summarizer_core::ports::PortResult;
use tracing::warn;

/// How many times to attempt an upstream call and how long to wait
/// between attempts. The delay doubles after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first call included. Clamped to at least 1.
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are
/// exhausted, returning the last error.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, operation: F) -> PortResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = PortResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.attempts {
                    return Err(err);
                }
                let delay = policy.base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(
                    "Upstream call failed (attempt {} of {}), retrying in {:?}: {}",
                    attempt, policy.attempts, delay, err
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
