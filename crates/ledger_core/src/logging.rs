use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LedgerConfig;

/// Initializes file + console logging under `~/.ledger/logs`.
/// Returns a guard that must be kept alive for the duration of the process.
pub fn init_logging(config: &LedgerConfig) -> Result<WorkerGuard> {
    init_logging_to_dir(&LedgerConfig::logs_dir()?, config)
}

/// Initializes logging into `logs_dir`. `RUST_LOG` wins over the configured
/// level when set.
pub fn init_logging_to_dir(logs_dir: &Path, config: &LedgerConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "ledger");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Configured level for everything, with the ledger crates at debug.
fn default_filter(config: &LedgerConfig) -> String {
    format!(
        "{},ledger_core=debug,ledger_tokens=debug",
        config.log_level.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_level(level: &str) -> LedgerConfig {
        LedgerConfig {
            log_level: level.into(),
            ..LedgerConfig::default()
        }
    }

    #[test]
    fn filter_uses_configured_level() {
        assert_eq!(
            default_filter(&config_with_level(" warn ")),
            "warn,ledger_core=debug,ledger_tokens=debug"
        );
    }

    #[test]
    fn init_logging_to_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // Only one global subscriber per process; a second init may fail,
        // but the directory must exist either way.
        let guard = init_logging_to_dir(&logs_dir, &config_with_level("warn"));
        assert!(logs_dir.exists());
        drop(guard);
    }

    #[test]
    fn init_logging_to_dir_reports_double_init() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_with_level("info");
        let first = init_logging_to_dir(&tmp.path().join("a"), &config);
        let second = init_logging_to_dir(&tmp.path().join("b"), &config);

        // At most one of the two can install the global subscriber.
        assert!(first.is_err() || second.is_err());
        if let Err(e) = second {
            assert!(e.to_string().contains("logging"), "unexpected error: {e}");
        }
    }
}
