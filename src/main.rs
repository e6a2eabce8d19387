//! tasklock demo: runs the reference admission scenario against the configured store.
//!
//! Wave one dispatches more holders than the task class allows, all at once,
//! and reports which were admitted. After the holder lifetime has elapsed a
//! second wave acquires, works, and releases one holder at a time; every one
//! of them is admitted because the first wave has expired.

use std::time::Duration;

use futures::future::join_all;
use tracing_subscriber::{EnvFilter, fmt};

use tasklock_core::config::AppConfig;
use tasklock_core::error::AppError;
use tasklock_core::types::AcquireOutcome;
use tasklock_service::TaskLocker;

/// Task class used by the demo.
const DEMO_PREFIX: &str = "tasklock_demo_processor";

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("TASKLOCK_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("TASKLOCK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = AppConfig::load(&config_path, &env)?;
    config.validate()?;
    Ok(config)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Run both waves of the scenario
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting tasklock demo v{}", env!("CARGO_PKG_VERSION"));

    let locker = TaskLocker::connect(&config).await?;
    let allowed = config.limiter.default_allowed_concurrent_tasks;
    let timeout = locker.default_timeout();

    // ── Wave 1: twice the capacity, concurrently ────────────────
    let wave_one: Vec<String> = (1..=allowed * 2).map(|i| i.to_string()).collect();
    let attempts = wave_one.iter().map(|postfix| {
        let locker = locker.clone();
        async move {
            let outcome = locker
                .try_acquire(DEMO_PREFIX, postfix, allowed, timeout)
                .await;
            (postfix.as_str(), outcome)
        }
    });

    let mut admitted = 0;
    for (postfix, outcome) in join_all(attempts).await {
        let outcome = outcome?;
        if outcome.acquired() {
            admitted += 1;
        }
        tracing::info!(postfix, outcome = %outcome, "Wave 1 attempt");
    }
    tracing::info!(
        admitted,
        denied = wave_one.len() - admitted,
        allowed,
        "Wave 1 complete"
    );

    // ── Wait for the first wave to expire ───────────────────────
    let pause = timeout + Duration::from_secs(1);
    tracing::info!(
        "Waiting {}s for unreleased holders to expire...",
        pause.as_secs()
    );
    tokio::time::sleep(pause).await;

    // ── Wave 2: acquire, work, release ──────────────────────────
    let start = allowed * 2;
    for i in start..start + allowed * 2 {
        let postfix = i.to_string();
        let outcome = locker
            .try_acquire(DEMO_PREFIX, &postfix, allowed, timeout)
            .await?;
        tracing::info!(postfix = %postfix, outcome = %outcome, "Wave 2 attempt");

        if outcome == AcquireOutcome::Acquired {
            tokio::time::sleep(Duration::from_millis(100)).await;
            locker.release(DEMO_PREFIX, &postfix).await?;
        }
    }

    let status = locker.status(DEMO_PREFIX).await?;
    tracing::info!(active = status.active, "Demo finished");

    locker.shutdown();
    Ok(())
}
