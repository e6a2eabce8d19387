//! Task locker: distributed concurrency limiting per task class.

use std::time::Duration;

use tracing::{debug, info, warn};

use tasklock_core::config::{AppConfig, LimiterConfig};
use tasklock_core::error::AppError;
use tasklock_core::result::AppResult;
use tasklock_core::traits::{ConcurrencyLimiter, MAX_HOLDER_TTL};
use tasklock_core::types::{AcquireOutcome, ClassStatus, CountingStrategy, HolderKey, TaskClass};
use tasklock_store::LimiterManager;

/// Limits how many holders of a task class may be active at once.
///
/// Holds no counts of its own; every decision is made by the store.
#[derive(Debug, Clone)]
pub struct TaskLocker {
    /// Backend limiter (Redis scripts or in-memory).
    limiter: LimiterManager,
    /// Defaults for callers that do not pass explicit limits.
    config: LimiterConfig,
}

impl TaskLocker {
    /// Create a locker over a limiter manager.
    pub fn new(limiter: LimiterManager, config: LimiterConfig) -> Self {
        Self { limiter, config }
    }

    /// Build the configured store backend and wrap it.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let manager = LimiterManager::new(config).await?;
        Ok(Self::new(manager, config.limiter.clone()))
    }

    /// Try to admit `postfix` into the `prefix` task class.
    ///
    /// The already-held check, the live-holder count and the record creation
    /// happen in one atomic store call. On success the holder record lives at
    /// most `timeout`, after which it no longer counts against capacity even
    /// if [`release`](Self::release) is never called.
    ///
    /// A store error leaves the record in an unknown state.
    pub async fn try_acquire(
        &self,
        prefix: &str,
        postfix: &str,
        allowed_concurrent_tasks: u32,
        timeout: Duration,
    ) -> AppResult<AcquireOutcome> {
        let holder = HolderKey::parse(prefix, postfix)?;
        validate_limits(allowed_concurrent_tasks, timeout)?;

        let outcome = self
            .limiter
            .try_acquire(&holder, allowed_concurrent_tasks, timeout)
            .await?;

        match outcome {
            AcquireOutcome::AlreadyHeld => warn!(
                prefix,
                postfix, "Holder already recorded; duplicate acquire ignored"
            ),
            _ => debug!(
                prefix,
                postfix,
                limit = allowed_concurrent_tasks,
                ttl_ms = timeout.as_millis() as u64,
                outcome = %outcome,
                "Acquire evaluated"
            ),
        }

        Ok(outcome)
    }

    /// [`try_acquire`](Self::try_acquire) with the configured default capacity and timeout.
    pub async fn try_acquire_default(
        &self,
        prefix: &str,
        postfix: &str,
    ) -> AppResult<AcquireOutcome> {
        self.try_acquire(
            prefix,
            postfix,
            self.config.default_allowed_concurrent_tasks,
            self.default_timeout(),
        )
        .await
    }

    /// Remove the holder record for `(prefix, postfix)`.
    ///
    /// Releasing a holder that was never recorded, or that has already
    /// expired, succeeds without effect.
    pub async fn release(&self, prefix: &str, postfix: &str) -> AppResult<()> {
        let holder = HolderKey::parse(prefix, postfix)?;
        let removed = self.limiter.release(&holder).await?;

        if removed {
            debug!(prefix, postfix, "Holder released");
        } else {
            debug!(prefix, postfix, "Release found no live holder");
        }
        Ok(())
    }

    /// Snapshot the live holders of a task class.
    pub async fn status(&self, prefix: &str) -> AppResult<ClassStatus> {
        let class = TaskClass::new(prefix)?;
        self.limiter.status(&class).await
    }

    /// Check that the store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.limiter.health_check().await
    }

    /// Name of the store backend in use.
    pub fn provider(&self) -> &'static str {
        self.limiter.provider()
    }

    /// Counting strategy the store backend was built with.
    pub fn strategy(&self) -> CountingStrategy {
        self.limiter.strategy()
    }

    /// Configured defaults.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Default holder lifetime.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.config.default_timeout_seconds)
    }

    /// Drop this handle; the store connection closes with the last clone.
    pub fn shutdown(self) {
        info!("Task locker shutting down");
        self.limiter.shutdown();
    }
}

fn validate_limits(allowed_concurrent_tasks: u32, timeout: Duration) -> AppResult<()> {
    if allowed_concurrent_tasks == 0 {
        return Err(AppError::validation(
            "allowed concurrent tasks must be positive",
        ));
    }
    if timeout < Duration::from_millis(1) {
        return Err(AppError::validation("timeout must be at least 1ms"));
    }
    if timeout > MAX_HOLDER_TTL {
        return Err(AppError::validation(format!(
            "timeout must not exceed {}s",
            MAX_HOLDER_TTL.as_secs()
        )));
    }
    Ok(())
}
