//! Redis-backed concurrency limiter.
//!
//! Suitable for any number of processes or hosts sharing one Redis.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use tracing::{debug, info};

use tasklock_core::error::AppError;
use tasklock_core::result::AppResult;
use tasklock_core::traits::{ConcurrencyLimiter, MAX_HOLDER_TTL};
use tasklock_core::types::{
    AcquireOutcome, ClassStatus, CountingStrategy, HolderKey, TaskClass,
};

use super::client::RedisClient;
use super::scripts::{
    COUNTER_ACQUIRE_SCRIPT, COUNTER_HOLDERS_SCRIPT, COUNTER_RELEASE_SCRIPT,
    ENUMERATION_ACQUIRE_SCRIPT, ScriptReply,
};

/// Limiter whose admission decision runs as one Lua script per call.
#[derive(Debug, Clone)]
pub struct RedisLimiter {
    /// Shared connection handle.
    client: RedisClient,
    /// Counting strategy, fixed for the lifetime of the limiter.
    strategy: CountingStrategy,
}

impl RedisLimiter {
    /// Create a limiter over an established client.
    pub fn new(client: RedisClient, strategy: CountingStrategy) -> Self {
        info!(strategy = %strategy, "Redis limiter initialized");
        Self { client, strategy }
    }
}

/// Convert a holder lifetime to whole milliseconds.
///
/// Rejects sub-millisecond values and anything above [`MAX_HOLDER_TTL`].
pub(crate) fn ttl_millis(ttl: Duration) -> AppResult<u64> {
    if ttl > MAX_HOLDER_TTL {
        return Err(AppError::validation("timeout is too large"));
    }
    let ms = u64::try_from(ttl.as_millis())
        .map_err(|_| AppError::validation("timeout is too large"))?;
    if ms == 0 {
        return Err(AppError::validation("timeout must be at least 1ms"));
    }
    Ok(ms)
}

#[async_trait]
impl ConcurrencyLimiter for RedisLimiter {
    async fn try_acquire(
        &self,
        holder: &HolderKey,
        limit: u32,
        ttl: Duration,
    ) -> AppResult<AcquireOutcome> {
        if limit == 0 {
            return Err(AppError::validation(
                "allowed concurrent tasks must be positive",
            ));
        }
        let ttl_ms = ttl_millis(ttl)?;
        let mut conn = self.client.conn_mut();

        let reply: i64 = match self.strategy {
            CountingStrategy::Enumeration => {
                let mut invocation = ENUMERATION_ACQUIRE_SCRIPT.key(holder.store_key());
                invocation
                    .arg(holder.class().namespace_pattern())
                    .arg(limit)
                    .arg(ttl_ms);
                self.client
                    .round_trip("EVALSHA acquire", invocation.invoke_async(&mut conn))
                    .await?
            }
            CountingStrategy::Counter => {
                let mut invocation = COUNTER_ACQUIRE_SCRIPT.key(holder.store_key());
                invocation
                    .key(holder.class().index_key())
                    .arg(holder.postfix())
                    .arg(limit)
                    .arg(ttl_ms);
                self.client
                    .round_trip("EVALSHA acquire", invocation.invoke_async(&mut conn))
                    .await?
            }
        };

        let outcome = ScriptReply(reply).into_outcome()?;
        debug!(
            holder = %holder,
            limit,
            ttl_ms,
            outcome = %outcome,
            "Redis admission evaluated"
        );
        Ok(outcome)
    }

    async fn release(&self, holder: &HolderKey) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();

        let removed: i64 = match self.strategy {
            CountingStrategy::Enumeration => {
                self.client
                    .round_trip("DEL", conn.del(holder.store_key()))
                    .await?
            }
            CountingStrategy::Counter => {
                let mut invocation = COUNTER_RELEASE_SCRIPT.key(holder.store_key());
                invocation
                    .key(holder.class().index_key())
                    .arg(holder.postfix());
                self.client
                    .round_trip("EVALSHA release", invocation.invoke_async(&mut conn))
                    .await?
            }
        };

        Ok(removed > 0)
    }

    async fn status(&self, class: &TaskClass) -> AppResult<ClassStatus> {
        let mut conn = self.client.conn_mut();

        let mut holders: Vec<String> = match self.strategy {
            CountingStrategy::Enumeration => {
                let keys: Vec<String> = self
                    .client
                    .round_trip("KEYS", conn.keys(class.namespace_pattern()))
                    .await?;
                let namespace = format!("{}:", class.prefix());
                keys.into_iter()
                    .filter_map(|k| k.strip_prefix(&namespace).map(str::to_string))
                    .collect()
            }
            CountingStrategy::Counter => {
                let invocation = COUNTER_HOLDERS_SCRIPT.key(class.index_key());
                self.client
                    .round_trip("EVALSHA holders", invocation.invoke_async(&mut conn))
                    .await?
            }
        };
        holders.sort();

        Ok(ClassStatus {
            prefix: class.prefix().to_string(),
            active: holders.len() as u32,
            holders,
            observed_at: Utc::now(),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.ping().await
    }
}
