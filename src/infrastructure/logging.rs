//! Logging system configuration and initialization
//!
//! Two outputs, each with its own level:
//! - Console: progress and counts for the operator (`logging.level`, or `RUST_LOG`)
//! - Dated log file: append-only diagnostics (`logging.file_level`), one line per event
//!
//! Timestamps are rendered in the run's configured UTC offset.

#![allow(clippy::uninlined_format_args)]

use crate::domain::SnapshotDate;
use crate::infrastructure::config::LoggingConfig;
use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Utc};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Time formatter for a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct OffsetTimeFormatter {
    offset: FixedOffset,
}

impl OffsetTimeFormatter {
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl FormatTime for OffsetTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Utc::now().with_timezone(&self.offset);
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Keeps the non-blocking file writer alive; flushes on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// File name of the log for a run date, e.g. `log_20250301.txt`
pub fn log_file_name(date: SnapshotDate) -> String {
    format!("log_{}.txt", date)
}

pub fn log_file_path(log_dir: &Path, date: SnapshotDate) -> PathBuf {
    log_dir.join(log_file_name(date))
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))
}

/// Console filter: `RUST_LOG` wins; otherwise the configured level with
/// noisy dependencies held back unless tracing everything.
fn console_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    parse_level(&config.level)?;
    let mut filter = EnvFilter::new(&config.level);
    if !config.level.to_lowercase().contains("trace") {
        for directive in [
            "sqlx::query=warn",
            "sqlx::mysql=warn",
            "sqlx::sqlite=warn",
            "thirtyfour=warn",
            "hyper=warn",
            "reqwest=info",
            "html5ever=warn",
            "selectors=warn",
        ] {
            filter = filter.add_directive(directive.parse()?);
        }
    }
    Ok(filter)
}

/// Initialize console and dated file logging for one run.
pub fn init_logging(
    config: &LoggingConfig,
    log_dir: &Path,
    date: SnapshotDate,
    offset: FixedOffset,
) -> Result<LoggingGuard> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let timer = OffsetTimeFormatter::new(offset);

    let console_layer = if config.console_output {
        Some(
            fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(timer)
                .with_target(false)
                .with_filter(console_filter(config)?),
        )
    } else {
        None
    };

    let mut file_guard = None;
    let file_layer = if config.file_output {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let file_appender = rolling::never(log_dir, log_file_name(date));
        let (file_writer, guard) = non_blocking(file_appender);
        file_guard = Some(guard);

        // Minimal file format: time + level + message
        Some(
            fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(timer)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false)
                .with_filter(parse_level(&config.file_level)?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Logging already initialized: {}", e))?;

    info!("Logging system initialized");
    info!("Console level: {}", config.level);
    if config.file_output {
        info!(
            "Log file: {:?} (level {})",
            log_file_path(log_dir, date),
            config.file_level
        );
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Catalog Sync System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
    info!("=======================================");
}
