//! In-process limiter for single-node deployments and tests.
//!
//! Each task class has its own mutex-guarded holder table, so classes never
//! contend with each other. A table is dropped from the map once it is empty
//! and no call is using it. Deadlines use [`tokio::time::Instant`], which
//! lets tests drive expiry with a paused clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use tasklock_core::error::AppError;
use tasklock_core::result::AppResult;
use tasklock_core::traits::{ConcurrencyLimiter, MAX_HOLDER_TTL};
use tasklock_core::types::{AcquireOutcome, ClassStatus, HolderKey, TaskClass};

/// Live holders of one task class, keyed by postfix.
#[derive(Debug, Default)]
struct ClassTable {
    deadlines: HashMap<String, Instant>,
}

impl ClassTable {
    /// Drop every holder whose deadline has passed.
    fn prune(&mut self, now: Instant) {
        self.deadlines.retain(|_, deadline| *deadline > now);
    }
}

/// Limiter backed by process memory.
///
/// Only callers inside this process share its state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLimiter {
    classes: Arc<DashMap<String, Arc<Mutex<ClassTable>>>>,
}

impl MemoryLimiter {
    /// Create an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, class: &TaskClass) -> Arc<Mutex<ClassTable>> {
        self.classes
            .entry(class.prefix().to_string())
            .or_default()
            .value()
            .clone()
    }

    fn existing_table(&self, class: &TaskClass) -> Option<Arc<Mutex<ClassTable>>> {
        self.classes
            .get(class.prefix())
            .map(|entry| entry.value().clone())
    }

    /// Remove the class table if it is empty and no other call holds it.
    ///
    /// Clones are only handed out under the map's shard lock, so a strong
    /// count of one inside `remove_if` means nobody can be using the table.
    fn evict_if_idle(&self, class: &TaskClass) {
        self.classes.remove_if(class.prefix(), |_, table| {
            Arc::strong_count(table) == 1
                && table
                    .try_lock()
                    .map(|t| t.deadlines.is_empty())
                    .unwrap_or(false)
        });
    }
}

#[async_trait]
impl ConcurrencyLimiter for MemoryLimiter {
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
        if ttl.is_zero() {
            return Err(AppError::validation("timeout must be positive"));
        }
        if ttl > MAX_HOLDER_TTL {
            return Err(AppError::validation("timeout is too large"));
        }

        let table = self.table(holder.class());
        let mut table = table.lock().await;
        let now = Instant::now();
        let deadline = now
            .checked_add(ttl)
            .ok_or_else(|| AppError::validation("timeout is too large"))?;
        table.prune(now);

        let outcome = if table.deadlines.contains_key(holder.postfix()) {
            AcquireOutcome::AlreadyHeld
        } else if table.deadlines.len() >= limit as usize {
            AcquireOutcome::Denied
        } else {
            table
                .deadlines
                .insert(holder.postfix().to_string(), deadline);
            AcquireOutcome::Acquired
        };

        debug!(
            holder = %holder,
            limit,
            active = table.deadlines.len(),
            outcome = %outcome,
            "Memory admission evaluated"
        );
        Ok(outcome)
    }

    async fn release(&self, holder: &HolderKey) -> AppResult<bool> {
        let Some(table) = self.existing_table(holder.class()) else {
            return Ok(false);
        };

        let removed = {
            let mut guard = table.lock().await;
            guard.prune(Instant::now());
            guard.deadlines.remove(holder.postfix()).is_some()
        };
        drop(table);
        self.evict_if_idle(holder.class());
        Ok(removed)
    }

    async fn status(&self, class: &TaskClass) -> AppResult<ClassStatus> {
        let mut holders: Vec<String> = match self.existing_table(class) {
            Some(table) => {
                let live = {
                    let mut guard = table.lock().await;
                    guard.prune(Instant::now());
                    guard.deadlines.keys().cloned().collect()
                };
                drop(table);
                self.evict_if_idle(class);
                live
            }
            None => Vec::new(),
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
        Ok(true)
    }
}
