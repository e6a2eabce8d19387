//! Store health command.

use serde::Serialize;

use tasklock_core::error::AppError;
use tasklock_core::types::CountingStrategy;
use tasklock_service::TaskLocker;

use super::{EXIT_OK, EXIT_UNHEALTHY};
use crate::output::{self, OutputFormat};

/// JSON shape of a health result
#[derive(Debug, Serialize)]
struct HealthReport {
    provider: &'static str,
    strategy: CountingStrategy,
    healthy: bool,
}

/// Execute the health command
pub async fn execute(locker: &TaskLocker, format: OutputFormat) -> Result<i32, AppError> {
    let report = HealthReport {
        provider: locker.provider(),
        strategy: locker.strategy(),
        healthy: locker.health_check().await?,
    };

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_kv("Provider", report.provider);
            output::print_kv("Strategy", &report.strategy.to_string());
            if report.healthy {
                output::print_success("Store is reachable");
            } else {
                output::print_warning("Store answered unexpectedly");
            }
        }
    }

    Ok(health_exit_code(report.healthy))
}

fn health_exit_code(healthy: bool) -> i32 {
    if healthy { EXIT_OK } else { EXIT_UNHEALTHY }
}
