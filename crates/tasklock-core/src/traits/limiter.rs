//! Concurrency limiter trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{AcquireOutcome, ClassStatus, HolderKey, TaskClass};

/// Longest holder lifetime any backend accepts (one year).
pub const MAX_HOLDER_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Admission and release against a shared store.
///
/// Implementations must evaluate the already-held check, the live-holder
/// count, and the record creation of [`try_acquire`](Self::try_acquire) as
/// one atomic unit. Two callers racing for the last slot must never both be
/// admitted.
#[async_trait]
pub trait ConcurrencyLimiter: Send + Sync + std::fmt::Debug + 'static {
    /// Try to record `holder` with lifetime `ttl`, admitting it only while
    /// fewer than `limit` holders of its class are live.
    ///
    /// On a store error nothing is guaranteed: the record may or may not
    /// have been written.
    async fn try_acquire(
        &self,
        holder: &HolderKey,
        limit: u32,
        ttl: Duration,
    ) -> AppResult<AcquireOutcome>;

    /// Remove the record for `holder`.
    ///
    /// Idempotent. Returns `true` if a live record was removed, `false` if
    /// there was nothing to remove (already released or expired).
    async fn release(&self, holder: &HolderKey) -> AppResult<bool>;

    /// Snapshot the live holders of a task class.
    async fn status(&self, class: &TaskClass) -> AppResult<ClassStatus>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
