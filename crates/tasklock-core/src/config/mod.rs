//! Application configuration schemas.
//!
//! Deserialized from TOML files via the `config` crate, overlaid with
//! `TASKLOCK__`-prefixed environment variables.

pub mod limiter;
pub mod logging;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::limiter::{LimiterConfig, RetryConfig};
pub use self::logging::LoggingConfig;
pub use self::store::{RedisStoreConfig, StoreConfig};

use crate::error::AppError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Limiter defaults and retry policy.
    #[serde(default)]
    pub limiter: LimiterConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `path` (optional), the `config/{env}` overlay (optional), and
    /// environment variables such as `TASKLOCK__STORE__REDIS__URL`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TASKLOCK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Reject configurations that cannot work at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.store.provider.as_str() {
            "redis" | "memory" => {}
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: redis, memory"
                )));
            }
        }
        if self.limiter.default_allowed_concurrent_tasks == 0 {
            return Err(AppError::configuration(
                "limiter.default_allowed_concurrent_tasks must be positive",
            ));
        }
        if self.limiter.default_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "limiter.default_timeout_seconds must be positive",
            ));
        }
        if self.limiter.retry.max_attempts == 0 {
            return Err(AppError::configuration(
                "limiter.retry.max_attempts must be at least 1",
            ));
        }
        if self.limiter.retry.multiplier < 1.0 {
            return Err(AppError::configuration(
                "limiter.retry.multiplier must be >= 1.0",
            ));
        }
        Ok(())
    }
}
