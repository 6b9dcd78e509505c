#![allow(clippy::uninlined_format_args)]

use crate::application::{CatalogScraper, ReconcileReport, ReconciliationWriter, ScrapeReport};
use crate::cli::Command;
use crate::domain::SnapshotDate;
use crate::infrastructure::{AppConfig, SnapshotStore, WebDriverCatalogPage};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// Settings and run date shared by every command of one invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: AppConfig,
    pub date: SnapshotDate,
}

impl RunContext {
    pub fn new(config: AppConfig, date: Option<SnapshotDate>) -> Result<Self> {
        let offset = config.clock.offset()?;
        let date = date.unwrap_or_else(|| SnapshotDate::today(offset));
        Ok(Self { config, date })
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.config.paths.raw_dir)
    }
}

/// Counts from a scrape followed by a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub found: usize,
    pub extracted: usize,
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
}

pub async fn scrape_catalog(ctx: &RunContext) -> Result<ScrapeReport> {
    let mut page = WebDriverCatalogPage::launch(&ctx.config.scraper, &ctx.config.page)
        .await
        .context("Failed to start browser session")?;

    let mut scraper = CatalogScraper::new(&ctx.config.scraper, ctx.snapshot_store(), ctx.date);
    Ok(scraper.run(&mut page).await?)
}

pub async fn load_snapshot(ctx: &RunContext, file: Option<&Path>) -> Result<ReconcileReport> {
    let path = file.map_or_else(|| ctx.snapshot_store().path_for(ctx.date), Path::to_path_buf);
    let writer = ReconciliationWriter::from_config(&ctx.config.store)?;
    Ok(writer.run(&path, ctx.date).await?)
}

pub async fn sync_catalog(ctx: &RunContext) -> Result<SyncSummary> {
    let report = scrape_catalog(ctx).await.context("Scrape aborted; load skipped")?;
    load_scraped(ctx, &report).await
}

/// Load the snapshot file a scrape just wrote.
async fn load_scraped(ctx: &RunContext, report: &ScrapeReport) -> Result<SyncSummary> {
    let loaded = load_snapshot(ctx, Some(&report.snapshot_path)).await?;
    Ok(SyncSummary {
        found: report.found,
        extracted: report.extracted(),
        skipped: report.skipped.len(),
        inserted: loaded.inserted,
        updated: loaded.updated,
    })
}

/// Run one CLI command to completion and print its summary.
pub async fn execute(command: Command, ctx: &RunContext) -> Result<()> {
    info!("Running {:?} for {}", command, ctx.date);

    let result = run_command(&command, ctx).await;
    if let Err(e) = &result {
        error!("{:?} aborted: {:#}", command, e);
    }
    result
}

async fn run_command(command: &Command, ctx: &RunContext) -> Result<()> {
    match command {
        Command::Scrape => {
            let report = scrape_catalog(ctx).await?;
            for skipped in &report.skipped {
                warn!("Skipped entry {}: {}", skipped.index, skipped.reason);
            }
            println!(
                "found {} / extracted {} / skipped {} -> {}",
                report.found,
                report.extracted(),
                report.skipped.len(),
                report.snapshot_path.display()
            );
        }
        Command::Load { file } => {
            let report = load_snapshot(ctx, file.as_deref()).await?;
            println!("inserted {} / updated {}", report.inserted, report.updated);
        }
        Command::Sync => {
            let summary = sync_catalog(ctx).await?;
            println!(
                "found {} / extracted {} / skipped {} / inserted {} / updated {}",
                summary.found, summary.extracted, summary.skipped, summary.inserted, summary.updated
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SkippedEntry;
    use crate::domain::CatalogBatch;
    use crate::domain::catalog_record::fixtures::details;
    use crate::test_utils::sqlite_url;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn context(dir: &Path) -> RunContext {
        let mut config = AppConfig::default();
        config.paths.raw_dir = dir.join("raw");
        config.store.database_url = Some(sqlite_url(dir));
        let date = SnapshotDate::from_naive(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        RunContext::new(config, Some(date)).unwrap()
    }

    #[tokio::test]
    async fn test_load_uses_run_date_snapshot() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());

        let mut batch = CatalogBatch::new(ctx.date);
        batch.append(details("Heat", "1995"));
        batch.append(details("Ronin", "1998"));
        ctx.snapshot_store().write(&batch.freeze()).unwrap();

        let report = load_snapshot(&ctx, None).await.unwrap();
        assert_eq!(report, ReconcileReport { inserted: 2, updated: 0 });
    }

    #[tokio::test]
    async fn test_load_without_snapshot_fails() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(load_snapshot(&ctx, None).await.is_err());
    }

    #[test]
    fn test_explicit_run_date_wins() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        assert_eq!(ctx.date.to_string(), "20250301");
        assert!(ctx.snapshot_store().path_for(ctx.date).ends_with("raw/top_250_movies_20250301.csv"));
    }

    #[tokio::test]
    async fn test_sync_loads_the_file_not_the_in_memory_batch() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());

        let mut scraped = CatalogBatch::new(ctx.date);
        scraped.append(details("Heat", "1995"));
        scraped.append(details("Ronin", "1998"));

        let mut on_disk = CatalogBatch::new(ctx.date);
        on_disk.append(details("Heat", "1995"));
        let snapshot_path = ctx.snapshot_store().write(&on_disk.freeze()).unwrap();

        let report = ScrapeReport {
            found: 3,
            skipped: vec![SkippedEntry {
                index: 2,
                reason: "no dialog".to_string(),
            }],
            snapshot: scraped.freeze(),
            snapshot_path,
        };

        let summary = load_scraped(&ctx, &report).await.unwrap();
        assert_eq!(
            summary,
            SyncSummary {
                found: 3,
                extracted: 2,
                skipped: 1,
                inserted: 1,
                updated: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_execute_propagates_load_failure() {
        let dir = tempdir().unwrap();
        let ctx = context(dir.path());
        let result = execute(Command::Load { file: None }, &ctx).await;
        assert!(result.is_err());
    }
}
