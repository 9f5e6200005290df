// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded exponential backoff for generation calls
//!
//! Only the rate-limit class is retried; everything else propagates on the
//! first attempt. The backoff wait is the pipeline's single suspension point
//! and is raced against the request's cancellation token so an abandoned
//! request never keeps retrying.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::types::GenerationError;

/// Retry policy for recoverable generation failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first attempt
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub initial_delay: Duration,
    /// Backoff multiplier applied per failed attempt
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given 0-indexed failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.initial_delay * self.multiplier.pow(attempt)
    }
}

/// Invoke `attempt_fn` with retries on the recoverable failure class.
///
/// Returns the first success, propagates the first non-recoverable failure
/// unchanged, and yields [`GenerationError::QuotaExhausted`] once the budget
/// is spent. Cancelling `cancel` during a backoff wait aborts with
/// [`GenerationError::Cancelled`] without starting another attempt. With
/// `max_attempts == 1` this is a single direct call.
pub async fn invoke_with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt_fn: F,
) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_recoverable() => {
                if attempt + 1 == max_attempts {
                    warn!(
                        "Generation rate limited on final attempt {}/{}",
                        attempt + 1,
                        max_attempts
                    );
                    return Err(GenerationError::QuotaExhausted {
                        attempts: max_attempts,
                    });
                }
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    "Generation rate limited on attempt {}/{}, waiting {:?} before retry",
                    attempt + 1,
                    max_attempts,
                    delay
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Generation cancelled during backoff wait");
                        return Err(GenerationError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(GenerationError::QuotaExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(5));
        assert_eq!(policy.multiplier, 2);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(20));
    }

    #[test]
    fn test_delay_with_unit_multiplier() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            multiplier: 1,
        };
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(100));
    }
}
