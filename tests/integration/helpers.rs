//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use tasklock_core::config::{AppConfig, LimiterConfig};
use tasklock_core::types::{AcquireOutcome, CountingStrategy};
use tasklock_service::TaskLocker;
use tasklock_store::LimiterManager;
use tasklock_store::memory::MemoryLimiter;

/// Environment variable naming a Redis instance the tests may write to.
pub const REDIS_URL_ENV: &str = "TASKLOCK_TEST_REDIS_URL";

/// A locker over a fresh in-memory store.
pub fn memory_locker() -> TaskLocker {
    let manager = LimiterManager::from_limiter(Arc::new(MemoryLimiter::new()));
    TaskLocker::new(manager, LimiterConfig::default())
}

/// A locker over the test Redis, or `None` when no Redis is configured.
pub async fn redis_locker(strategy: CountingStrategy) -> Option<TaskLocker> {
    let url = std::env::var(REDIS_URL_ENV).ok()?;

    let mut config = AppConfig::default();
    config.store.provider = "redis".to_string();
    config.store.redis.url = url;
    config.limiter.strategy = strategy;

    Some(
        TaskLocker::connect(&config)
            .await
            .expect("Failed to connect to test Redis"),
    )
}

/// A task class prefix no other test run shares.
pub fn unique_prefix(name: &str) -> String {
    format!("tasklock_test_{name}_{}", uuid::Uuid::new_v4().simple())
}

/// Fire one acquire per postfix concurrently and return the outcomes in order.
pub async fn acquire_all(
    locker: &TaskLocker,
    prefix: &str,
    postfixes: impl IntoIterator<Item = String>,
    allowed: u32,
    timeout: Duration,
) -> Vec<AcquireOutcome> {
    let handles: Vec<_> = postfixes
        .into_iter()
        .map(|postfix| {
            let locker = locker.clone();
            let prefix = prefix.to_string();
            tokio::spawn(async move {
                locker
                    .try_acquire(&prefix, &postfix, allowed, timeout)
                    .await
                    .expect("acquire failed")
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("acquire task panicked"))
        .collect()
}

/// Count outcomes of each kind as `(acquired, denied, already_held)`.
pub fn tally(outcomes: &[AcquireOutcome]) -> (usize, usize, usize) {
    outcomes.iter().fold((0, 0, 0), |(a, d, h), o| match o {
        AcquireOutcome::Acquired => (a + 1, d, h),
        AcquireOutcome::Denied => (a, d + 1, h),
        AcquireOutcome::AlreadyHeld => (a, d, h + 1),
    })
}

/// Postfixes `from..=to` as strings.
pub fn postfixes(from: u32, to: u32) -> Vec<String> {
    (from..=to).map(|i| i.to_string()).collect()
}
