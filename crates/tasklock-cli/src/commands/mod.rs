//! CLI command definitions and dispatch.

pub mod health;
pub mod lock;
pub mod status;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use tasklock_core::config::AppConfig;
use tasklock_core::error::AppError;
use tasklock_service::TaskLocker;

/// Exit code for a successful command.
pub const EXIT_OK: i32 = 0;
/// Exit code when an acquire was denied or the holder was already recorded.
pub const EXIT_NOT_ACQUIRED: i32 = 2;
/// Exit code when the store answered a health check unexpectedly.
pub const EXIT_UNHEALTHY: i32 = 3;

/// tasklock: distributed concurrency limiter
#[derive(Debug, Parser)]
#[command(name = "tasklock", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay (loads config/<env>.toml when present)
    #[arg(long, env = "TASKLOCK_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Try to acquire a slot in a task class
    Acquire(lock::AcquireArgs),
    /// Release a held slot
    Release(lock::ReleaseArgs),
    /// Show live holders of a task class
    Status(status::StatusArgs),
    /// Check store connectivity
    Health,
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub async fn execute(&self) -> Result<i32, AppError> {
        let config = load_config(&self.config, &self.env)?;
        let locker = TaskLocker::connect(&config).await?;

        let code = match &self.command {
            Commands::Acquire(args) => lock::acquire(args, &locker, self.format).await?,
            Commands::Release(args) => lock::release(args, &locker, self.format).await?,
            Commands::Status(args) => status::execute(args, &locker, self.format).await?,
            Commands::Health => health::execute(&locker, self.format).await?,
        };

        locker.shutdown();
        Ok(code)
    }
}

/// Helper: load and validate configuration
pub fn load_config(config_path: &str, env: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(config_path, env)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_acquire() {
        let cli = Cli::try_parse_from([
            "tasklock", "--format", "json", "acquire", "reports", "42", "--allowed", "3",
            "--timeout-secs", "5",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Acquire(args) => {
                assert_eq!(args.prefix, "reports");
                assert_eq!(args.postfix.as_deref(), Some("42"));
                assert_eq!(args.allowed, Some(3));
                assert_eq!(args.timeout_secs, Some(5));
                assert!(!args.wait);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_release_requires_postfix() {
        assert!(Cli::try_parse_from(["tasklock", "release", "reports"]).is_err());
    }
}
