//! Limiter defaults and calling-layer retry policy.

use serde::{Deserialize, Serialize};

use crate::types::CountingStrategy;

/// Limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Counting strategy for every task class in this deployment.
    #[serde(default)]
    pub strategy: CountingStrategy,
    /// Capacity used when a caller does not supply one.
    #[serde(default = "default_allowed")]
    pub default_allowed_concurrent_tasks: u32,
    /// Holder lifetime used when a caller does not supply one, in seconds.
    #[serde(default = "default_timeout")]
    pub default_timeout_seconds: u64,
    /// Backoff policy for callers that choose to retry denials.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            strategy: CountingStrategy::default(),
            default_allowed_concurrent_tasks: default_allowed(),
            default_timeout_seconds: default_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff for retrying denied acquires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Multiplier applied after each denied attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_allowed() -> u32 {
    3
}

fn default_timeout() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_delay() -> u64 {
    100
}

fn default_max_delay() -> u64 {
    5_000
}

fn default_multiplier() -> f64 {
    2.0
}
