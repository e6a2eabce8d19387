//! Protocol properties against the in-memory store.

use std::time::Duration;

use tasklock_core::types::AcquireOutcome;

use crate::helpers::{acquire_all, memory_locker, postfixes, tally};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_invariant_under_concurrency() {
    let locker = memory_locker();

    for limit in [1u32, 3, 8] {
        let prefix = format!("capacity_{limit}");
        let outcomes = acquire_all(&locker, &prefix, postfixes(1, limit * 2), limit, TIMEOUT).await;

        let (acquired, denied, held) = tally(&outcomes);
        assert_eq!(acquired, limit as usize);
        assert_eq!(denied, limit as usize);
        assert_eq!(held, 0);
        assert_eq!(locker.status(&prefix).await.unwrap().active, limit);
    }
}

#[tokio::test(start_paused = true)]
async fn test_expiry_self_heals_without_release() {
    let locker = memory_locker();
    let outcomes = acquire_all(&locker, "expiry", postfixes(1, 2), 2, TIMEOUT).await;
    assert_eq!(tally(&outcomes), (2, 0, 0));

    let outcome = locker
        .try_acquire("expiry", "3", 2, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(outcome, AcquireOutcome::Denied);

    tokio::time::advance(TIMEOUT + Duration::from_millis(1)).await;

    let outcome = locker
        .try_acquire("expiry", "3", 2, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(outcome, AcquireOutcome::Acquired);
}

#[tokio::test]
async fn test_release_frees_capacity_immediately() {
    let locker = memory_locker();
    let outcomes = acquire_all(&locker, "release", postfixes(1, 3), 3, TIMEOUT).await;
    assert_eq!(tally(&outcomes), (3, 0, 0));

    locker.release("release", "2").await.unwrap();

    let outcome = locker
        .try_acquire("release", "4", 3, TIMEOUT)
        .await
        .unwrap();
    assert_eq!(outcome, AcquireOutcome::Acquired);
}

#[tokio::test]
async fn test_release_of_unknown_holder_is_noop() {
    let locker = memory_locker();
    locker
        .try_acquire("idempotent", "1", 2, TIMEOUT)
        .await
        .unwrap();

    locker.release("idempotent", "missing").await.unwrap();
    locker.release("never_used_class", "1").await.unwrap();

    let status = locker.status("idempotent").await.unwrap();
    assert_eq!(status.holders, vec!["1".to_string()]);
}

#[tokio::test]
async fn test_reacquire_of_held_identity_is_reported() {
    let locker = memory_locker();
    let first = locker.try_acquire("dup", "7", 5, TIMEOUT).await.unwrap();
    let second = locker.try_acquire("dup", "7", 5, TIMEOUT).await.unwrap();

    assert_eq!(first.as_flags(), (true, false));
    assert_eq!(second.as_flags(), (false, true));
    assert_eq!(locker.status("dup").await.unwrap().active, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reference_scenario() {
    let locker = memory_locker();

    let wave_one = acquire_all(&locker, "scenario", postfixes(1, 6), 3, TIMEOUT).await;
    assert_eq!(tally(&wave_one), (3, 3, 0));

    tokio::time::advance(Duration::from_secs(6)).await;

    for postfix in postfixes(6, 11) {
        let outcome = locker
            .try_acquire("scenario", &postfix, 3, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(outcome, AcquireOutcome::Acquired, "postfix {postfix}");
        locker.release("scenario", &postfix).await.unwrap();
    }
    assert_eq!(locker.status("scenario").await.unwrap().active, 0);
}
