//! Limiter manager that dispatches to the configured store backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use tasklock_core::config::AppConfig;
use tasklock_core::error::AppError;
use tasklock_core::result::AppResult;
use tasklock_core::traits::ConcurrencyLimiter;
use tasklock_core::types::{AcquireOutcome, ClassStatus, CountingStrategy, HolderKey, TaskClass};

/// Limiter manager wrapping the configured backend.
///
/// Construct once per process and share it behind an `Arc`; it owns the
/// process's only store connection.
#[derive(Debug, Clone)]
pub struct LimiterManager {
    /// The inner limiter.
    inner: Arc<dyn ConcurrencyLimiter>,
    /// Backend name, for logs and the CLI.
    provider: &'static str,
    /// Counting strategy in effect.
    strategy: CountingStrategy,
}

impl LimiterManager {
    /// Create a limiter manager from configuration.
    pub async fn new(config: &AppConfig) -> AppResult<Self> {
        let strategy = config.limiter.strategy;
        let (inner, provider): (Arc<dyn ConcurrencyLimiter>, &'static str) =
            match config.store.provider.as_str() {
                #[cfg(feature = "redis-backend")]
                "redis" => {
                    info!(strategy = %strategy, "Initializing Redis limiter");
                    let client = crate::redis::RedisClient::connect(&config.store.redis).await?;
                    (
                        Arc::new(crate::redis::RedisLimiter::new(client, strategy)),
                        "redis",
                    )
                }
                #[cfg(feature = "memory")]
                "memory" => {
                    info!("Initializing in-memory limiter");
                    (Arc::new(crate::memory::MemoryLimiter::new()), "memory")
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown store provider: '{other}'. Supported: redis, memory"
                    )));
                }
            };

        Ok(Self {
            inner,
            provider,
            strategy,
        })
    }

    /// Create a manager from an existing limiter (for testing).
    pub fn from_limiter(limiter: Arc<dyn ConcurrencyLimiter>) -> Self {
        Self {
            inner: limiter,
            provider: "custom",
            strategy: CountingStrategy::default(),
        }
    }

    /// Name of the active backend.
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    /// Counting strategy in effect.
    pub fn strategy(&self) -> CountingStrategy {
        self.strategy
    }

    /// Log shutdown; the connection closes when the last clone is dropped.
    pub fn shutdown(self) {
        info!(provider = self.provider, "Shutting down limiter");
        drop(self.inner);
    }
}

#[async_trait]
impl ConcurrencyLimiter for LimiterManager {
    async fn try_acquire(
        &self,
        holder: &HolderKey,
        limit: u32,
        ttl: Duration,
    ) -> AppResult<AcquireOutcome> {
        self.inner.try_acquire(holder, limit, ttl).await
    }

    async fn release(&self, holder: &HolderKey) -> AppResult<bool> {
        self.inner.release(holder).await
    }

    async fn status(&self, class: &TaskClass) -> AppResult<ClassStatus> {
        self.inner.status(class).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
