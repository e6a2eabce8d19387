//! Protocol properties against a live Redis.
//!
//! Skipped unless `TASKLOCK_TEST_REDIS_URL` is set. Every test uses its own
//! prefix, so runs can share one Redis.

use std::time::Duration;

use tasklock_core::types::{AcquireOutcome, CountingStrategy};

use crate::helpers::{REDIS_URL_ENV, acquire_all, postfixes, redis_locker, tally, unique_prefix};

const STRATEGIES: [CountingStrategy; 2] = [CountingStrategy::Enumeration, CountingStrategy::Counter];

macro_rules! redis_or_skip {
    ($strategy:expr) => {
        match redis_locker($strategy).await {
            Some(locker) => locker,
            None => {
                eprintln!("{REDIS_URL_ENV} not set; skipping");
                return;
            }
        }
    };
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_invariant_under_concurrency() {
    for strategy in STRATEGIES {
        let locker = redis_or_skip!(strategy);
        let prefix = unique_prefix("capacity");

        let outcomes =
            acquire_all(&locker, &prefix, postfixes(1, 20), 10, Duration::from_secs(10)).await;
        assert_eq!(tally(&outcomes), (10, 10, 0), "strategy {strategy}");
        assert_eq!(locker.status(&prefix).await.unwrap().active, 10);
    }
}

#[tokio::test]
async fn test_expiry_self_heals_without_release() {
    for strategy in STRATEGIES {
        let locker = redis_or_skip!(strategy);
        let prefix = unique_prefix("expiry");
        let ttl = Duration::from_millis(300);

        let outcomes = acquire_all(&locker, &prefix, postfixes(1, 2), 2, ttl).await;
        assert_eq!(tally(&outcomes), (2, 0, 0));
        assert_eq!(
            locker.try_acquire(&prefix, "3", 2, ttl).await.unwrap(),
            AcquireOutcome::Denied
        );

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(
            locker.try_acquire(&prefix, "3", 2, ttl).await.unwrap(),
            AcquireOutcome::Acquired,
            "strategy {strategy}"
        );
    }
}

#[tokio::test]
async fn test_release_and_reacquire() {
    for strategy in STRATEGIES {
        let locker = redis_or_skip!(strategy);
        let prefix = unique_prefix("release");
        let ttl = Duration::from_secs(10);

        let outcomes = acquire_all(&locker, &prefix, postfixes(1, 3), 3, ttl).await;
        assert_eq!(tally(&outcomes), (3, 0, 0));

        assert_eq!(
            locker.try_acquire(&prefix, "1", 3, ttl).await.unwrap(),
            AcquireOutcome::AlreadyHeld
        );

        locker.release(&prefix, "1").await.unwrap();
        locker.release(&prefix, "1").await.unwrap();
        locker.release(&prefix, "absent").await.unwrap();

        assert_eq!(
            locker.try_acquire(&prefix, "4", 3, ttl).await.unwrap(),
            AcquireOutcome::Acquired,
            "strategy {strategy}"
        );

        let status = locker.status(&prefix).await.unwrap();
        assert_eq!(status.holders, vec!["2", "3", "4"]);

        for postfix in status.holders {
            locker.release(&prefix, &postfix).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_health_check() {
    let locker = redis_or_skip!(CountingStrategy::Enumeration);
    assert!(locker.health_check().await.unwrap());
}
