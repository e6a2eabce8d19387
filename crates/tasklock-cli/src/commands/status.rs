//! Task class status command.

use clap::Args;
use tabled::Tabled;

use tasklock_core::error::AppError;
use tasklock_core::types::ClassStatus;
use tasklock_service::TaskLocker;

use super::EXIT_OK;
use crate::output::{self, OutputFormat};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Task class prefix
    pub prefix: String,
}

/// One live holder row
#[derive(Debug, Tabled)]
struct HolderRow {
    #[tabled(rename = "Postfix")]
    postfix: String,
    #[tabled(rename = "Key")]
    key: String,
}

/// Execute the status command
pub async fn execute(
    args: &StatusArgs,
    locker: &TaskLocker,
    format: OutputFormat,
) -> Result<i32, AppError> {
    let status = locker.status(&args.prefix).await?;

    match format {
        OutputFormat::Json => output::print_json(&status),
        OutputFormat::Table => {
            println!("Task Class Status:");
            output::print_kv("Prefix", &status.prefix);
            output::print_kv("Active Holders", &status.active.to_string());
            output::print_kv("Observed At", &status.observed_at.to_rfc3339());
            println!();

            output::print_table(&holder_rows(&status));
        }
    }

    Ok(EXIT_OK)
}

fn holder_rows(status: &ClassStatus) -> Vec<HolderRow> {
    status
        .holders
        .iter()
        .map(|postfix| HolderRow {
            postfix: postfix.clone(),
            key: format!("{}:{}", status.prefix, postfix),
        })
        .collect()
}
