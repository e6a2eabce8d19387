//! Calling-layer retry for denied acquires.
//!
//! The locker itself never waits or queues. Callers that prefer to wait for
//! a slot wrap it in [`acquire_with_backoff`], which polls with exponential
//! backoff. There is no fairness among waiters.

use std::time::Duration;

use tracing::debug;

use tasklock_core::config::RetryConfig;
use tasklock_core::result::AppResult;
use tasklock_core::types::AcquireOutcome;

use crate::locker::TaskLocker;

/// Exponential backoff policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor between delays.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Delay to sleep after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped_ms = scaled_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms.round() as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.multiplier.max(1.0),
        }
    }
}

/// Acquire, retrying only while the class is at capacity.
///
/// `AlreadyHeld` and store errors are returned immediately; the last
/// `Denied` is returned once attempts run out.
pub async fn acquire_with_backoff(
    locker: &TaskLocker,
    prefix: &str,
    postfix: &str,
    allowed_concurrent_tasks: u32,
    timeout: Duration,
    policy: &RetryPolicy,
) -> AppResult<AcquireOutcome> {
    let mut attempt = 1;
    loop {
        let outcome = locker
            .try_acquire(prefix, postfix, allowed_concurrent_tasks, timeout)
            .await?;

        if outcome != AcquireOutcome::Denied || attempt >= policy.max_attempts {
            return Ok(outcome);
        }

        let delay = policy.delay_after(attempt);
        debug!(
            prefix,
            postfix,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Task class at capacity, backing off"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tasklock_core::config::LimiterConfig;
    use tasklock_store::LimiterManager;
    use tasklock_store::memory::MemoryLimiter;

    fn locker() -> TaskLocker {
        let manager = LimiterManager::from_limiter(Arc::new(MemoryLimiter::new()));
        TaskLocker::new(manager, LimiterConfig::default())
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_growth_is_capped() {
        let p = policy();
        assert_eq!(p.delay_after(1), Duration::from_millis(100));
        assert_eq!(p.delay_after(2), Duration::from_millis(200));
        assert_eq!(p.delay_after(3), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_with_denied() {
        let locker = locker();
        let ttl = Duration::from_secs(60);
        locker.try_acquire("jobs", "1", 1, ttl).await.unwrap();

        let started = tokio::time::Instant::now();
        let outcome = acquire_with_backoff(&locker, "jobs", "2", 1, ttl, &policy())
            .await
            .unwrap();
        assert_eq!(outcome, AcquireOutcome::Denied);
        // 100 + 200 + 250 between four attempts.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(550));
        assert!(elapsed < Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_once_holder_expires() {
        let locker = locker();
        locker
            .try_acquire("jobs", "1", 1, Duration::from_millis(150))
            .await
            .unwrap();

        let outcome = acquire_with_backoff(
            &locker,
            "jobs",
            "2",
            1,
            Duration::from_secs(5),
            &policy(),
        )
        .await
        .unwrap();
        assert_eq!(outcome, AcquireOutcome::Acquired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_held_is_not_retried() {
        let locker = locker();
        let ttl = Duration::from_secs(60);
        locker.try_acquire("jobs", "1", 1, ttl).await.unwrap();

        let started = tokio::time::Instant::now();
        let outcome = acquire_with_backoff(&locker, "jobs", "1", 1, ttl, &policy())
            .await
            .unwrap();
        assert_eq!(outcome, AcquireOutcome::AlreadyHeld);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
