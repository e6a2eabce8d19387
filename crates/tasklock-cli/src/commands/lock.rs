//! Acquire and release commands.

use std::time::Duration;

use clap::Args;
use serde::Serialize;

use tasklock_core::error::AppError;
use tasklock_core::types::AcquireOutcome;
use tasklock_service::{RetryPolicy, TaskLocker, acquire_with_backoff};

use super::{EXIT_NOT_ACQUIRED, EXIT_OK};
use crate::output::{self, OutputFormat};

/// Arguments for the acquire command
#[derive(Debug, Args)]
pub struct AcquireArgs {
    /// Task class prefix
    pub prefix: String,
    /// Holder postfix (a random UUID when omitted)
    pub postfix: Option<String>,
    /// Allowed concurrent tasks (config default when omitted)
    #[arg(short, long)]
    pub allowed: Option<u32>,
    /// Holder lifetime in seconds (config default when omitted)
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,
    /// Retry with backoff while the task class is full
    #[arg(short, long)]
    pub wait: bool,
}

/// Arguments for the release command
#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// Task class prefix
    pub prefix: String,
    /// Holder postfix
    pub postfix: String,
}

/// JSON shape of an acquire result
#[derive(Debug, Serialize)]
struct AcquireReport<'a> {
    prefix: &'a str,
    postfix: &'a str,
    key: String,
    acquired: bool,
    already_held: bool,
    outcome: AcquireOutcome,
    timeout_seconds: u64,
}

/// Execute the acquire command
pub async fn acquire(
    args: &AcquireArgs,
    locker: &TaskLocker,
    format: OutputFormat,
) -> Result<i32, AppError> {
    let postfix = args
        .postfix
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let allowed = args
        .allowed
        .unwrap_or(locker.config().default_allowed_concurrent_tasks);
    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| locker.default_timeout());

    let outcome = if args.wait {
        let policy = RetryPolicy::from(&locker.config().retry);
        acquire_with_backoff(locker, &args.prefix, &postfix, allowed, timeout, &policy).await?
    } else {
        locker
            .try_acquire(&args.prefix, &postfix, allowed, timeout)
            .await?
    };

    let report = AcquireReport {
        prefix: &args.prefix,
        postfix: &postfix,
        key: format!("{}:{}", args.prefix, postfix),
        acquired: outcome.acquired(),
        already_held: outcome.already_held(),
        outcome,
        timeout_seconds: timeout.as_secs(),
    };

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => match outcome {
            AcquireOutcome::Acquired => {
                output::print_success(&format!(
                    "Acquired {} for {}s",
                    report.key, report.timeout_seconds
                ));
            }
            AcquireOutcome::Denied => {
                output::print_warning(&format!(
                    "Task class '{}' is at capacity ({} allowed)",
                    args.prefix, allowed
                ));
            }
            AcquireOutcome::AlreadyHeld => {
                output::print_warning(&format!("{} is already held", report.key));
            }
        },
    }

    Ok(if outcome.acquired() {
        EXIT_OK
    } else {
        EXIT_NOT_ACQUIRED
    })
}

/// Execute the release command
pub async fn release(
    args: &ReleaseArgs,
    locker: &TaskLocker,
    format: OutputFormat,
) -> Result<i32, AppError> {
    locker.release(&args.prefix, &args.postfix).await?;

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "prefix": args.prefix,
            "postfix": args.postfix,
            "released": true,
        })),
        OutputFormat::Table => {
            output::print_success(&format!("Released {}:{}", args.prefix, args.postfix))
        }
    }

    Ok(EXIT_OK)
}
