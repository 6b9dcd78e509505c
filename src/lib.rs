//! Catalog Sync - Top 250 movie chart extraction and store reconciliation
//!
//! Scrapes each entry's detail panel through a WebDriver session, writes a
//! dated CSV snapshot, and upserts it into a SQL table keyed by a
//! content-derived identity key.

// Module declarations
pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod infrastructure;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use clap::Parser;
use cli::Cli;
use commands::RunContext;
use infrastructure::{AppConfig, init_logging, log_system_info};

/// Parse arguments, load configuration and run the selected command.
pub fn run() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let ctx = RunContext::new(config, cli.date)?;
    let offset = ctx.config.clock.offset()?;
    let _logging = init_logging(&ctx.config.logging, &ctx.config.paths.log_dir, ctx.date, offset)?;
    log_system_info();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::execute(cli.command(), &ctx))
}
