//! Logging initialization and slow-operation reporting
//!
//! This module provides:
//! - Subscriber initialization (stderr in development, file + stderr errors in production)
//! - [`timed`], a wrapper that reports operations slower than the configured threshold

use anyhow::Result;
use std::fmt::Display;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::{self, Config, Environment};

/// Returns the log file to write to, if any
///
/// Only production deployments with `LOG_FILE_PATH` set log to a file.
pub fn log_file_target(config: &Config) -> Option<&Path> {
    match config.environment {
        Environment::Production => config.log_file_path.as_deref(),
        Environment::Development => None,
    }
}

/// Initialize the global `tracing` subscriber
///
/// # Arguments
/// * `config` - Provides `LOG_LEVEL`, `ENVIRONMENT` and `LOG_FILE_PATH`
///
/// # Returns
/// * `Ok(())` - Subscriber installed
/// * `Err(anyhow::Error)` - Invalid filter, unwritable log file or a subscriber was already set
pub fn init_logger(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| anyhow::anyhow!("Invalid LOG_LEVEL '{}': {}", config.log_level, e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match log_file_target(config) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs_err::create_dir_all(parent)?;
            }
            let file = fs_err::OpenOptions::new().create(true).append(true).open(path)?;

            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(LevelFilter::ERROR),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
        }
    }

    tracing::info!(
        environment = config.environment.as_str(),
        level = %config.log_level,
        "logger initialized"
    );
    Ok(())
}

/// Runs `future` and warns when it took longer than the slow-operation threshold
///
/// Failed operations are reported as `<operation>_error` together with the error.
/// The result is returned unchanged.
pub async fn timed<T, E, F>(operation: &str, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let started = Instant::now();
    let result = future.await;
    let elapsed = started.elapsed();

    if elapsed.as_millis() > config::logging::SLOW_OPERATION_MS {
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        match &result {
            Ok(_) => tracing::warn!(operation, duration_ms, "slow operation"),
            Err(e) => tracing::warn!(
                operation = %format!("{}_error", operation),
                duration_ms,
                error = %e,
                "slow operation"
            ),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_with(environment: Environment, path: Option<&str>) -> Config {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.environment = environment;
        config.log_file_path = path.map(PathBuf::from);
        config
    }

    #[test]
    fn test_file_logging_only_in_production() {
        let prod = config_with(Environment::Production, Some("logs/bot.log"));
        assert_eq!(log_file_target(&prod), Some(Path::new("logs/bot.log")));

        let dev = config_with(Environment::Development, Some("logs/bot.log"));
        assert_eq!(log_file_target(&dev), None);

        let prod_without_path = config_with(Environment::Production, None);
        assert_eq!(log_file_target(&prod_without_path), None);
    }

    #[tokio::test]
    async fn test_timed_passes_results_through() {
        let ok: Result<u32, String> = timed("fast_op", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u32, String> = timed("failing_op", async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            Err("nope".to_string())
        })
        .await;
        assert_eq!(err, Err("nope".to_string()));
    }
}
