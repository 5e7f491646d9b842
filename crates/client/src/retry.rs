//! Bounded retry with exponential backoff.
//!
//! After failed attempt `n` (1-based) the policy sleeps
//! `unit * backoff_factor^n` before trying again. With the defaults that is
//! 2 s, 4 s, 8 s, ... 64 s between the seven attempts. No sleep follows the
//! final attempt.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Classification of an error for retry purposes.
pub trait Retryable {
    /// Whether another attempt may succeed.
    fn is_retryable(&self) -> bool;

    /// Whether the failure was the backend throttling us.
    fn is_rate_limited(&self) -> bool {
        false
    }
}

/// Outcome of an operation that did not succeed under a [`RetryPolicy`].
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted { attempts: u32, source: E },

    /// An attempt failed with an error that retrying cannot fix.
    #[error("attempt {attempts} failed permanently: {source}")]
    Permanent { attempts: u32, source: E },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Permanent { attempts, .. } => *attempts,
        }
    }

    /// The last error seen.
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { source, .. } | Self::Permanent { source, .. } => source,
        }
    }
}

/// Retry policy: how many attempts and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub backoff_factor: u32,
    /// Delay unit multiplied by `backoff_factor^n`.
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            backoff_factor: 2,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that makes a single attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_factor: 1,
            unit: Duration::ZERO,
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.unit
            .saturating_mul(self.backoff_factor.saturating_pow(attempt))
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempts
    /// run out.
    ///
    /// # Errors
    ///
    /// Returns `RetryError::Permanent` on the first non-retryable error and
    /// `RetryError::Exhausted` with the last error once `max_attempts`
    /// retryable failures have been seen.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::error::Error + 'static,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(RetryError::Permanent {
                    attempts: attempt,
                    source: error,
                });
            }

            if attempt >= max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.delay_after(attempt);
            if error.is_rate_limited() {
                warn!(attempt, ?delay, "rate limited, backing off");
            } else {
                warn!(attempt, ?delay, error = %error, "attempt failed, retrying");
            }
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, Error)]
    enum TestError {
        #[error("transient")]
        Transient,
        #[error("throttled")]
        Throttled,
        #[error("fatal")]
        Fatal,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            !matches!(self, Self::Fatal)
        }

        fn is_rate_limited(&self) -> bool {
            matches!(self, Self::Throttled)
        }
    }

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=6).map(|n| policy.delay_after(n).as_secs()).collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32, 64]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_three_failures() {
        let calls = &AtomicU32::new(0);
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run(move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 3 { Err(TestError::Throttled) } else { Ok(n) }
            })
            .await;

        assert_eq!(result.expect("eventually succeeds"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // Three sleeps: 2 + 4 + 8
        assert_eq!(started.elapsed(), Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        let err = result.expect_err("always fails");
        assert!(matches!(err, RetryError::Exhausted { attempts: 7, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 7);
        // Six sleeps: 2 + 4 + 8 + 16 + 32 + 64
        assert_eq!(started.elapsed(), Duration::from_secs(126));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_immediately() {
        let calls = &AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            })
            .await;

        let err = result.expect_err("fatal");
        assert_eq!(err.attempts(), 1);
        assert!(matches!(err.into_inner(), TestError::Fatal));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::none()
        };

        let _: Result<(), _> = policy
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Transient)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
