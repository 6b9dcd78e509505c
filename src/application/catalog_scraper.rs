//! Catalog scrape run
//!
//! Waits for the catalog page, walks every entry present in the initial load
//! through [`ItemExtractor`], and writes the frozen batch as the run's
//! snapshot. The page session is released on every exit path.

#![allow(clippy::uninlined_format_args)]

use crate::application::item_extractor::{ItemExtractor, ItemOutcome};
use crate::domain::{CatalogBatch, CatalogSnapshot, SnapshotDate};
use crate::infrastructure::catalog_page::CatalogPage;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::page_error::PageError;
use crate::infrastructure::snapshot_store::{SnapshotError, SnapshotStore};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

/// Page-level failures that abort a scrape run
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Catalog page unavailable: {0}")]
    Page(#[from] PageError),

    #[error("Snapshot could not be written: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Entry that produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub found: usize,
    pub skipped: Vec<SkippedEntry>,
    pub snapshot: CatalogSnapshot,
    pub snapshot_path: PathBuf,
}

impl ScrapeReport {
    pub fn extracted(&self) -> usize {
        self.snapshot.len()
    }
}

pub struct CatalogScraper {
    extractor: ItemExtractor,
    store: SnapshotStore,
    date: SnapshotDate,
}

impl CatalogScraper {
    pub fn new(config: &ScraperConfig, store: SnapshotStore, date: SnapshotDate) -> Self {
        Self::with_extractor(ItemExtractor::new(config), store, date)
    }

    pub fn with_extractor(extractor: ItemExtractor, store: SnapshotStore, date: SnapshotDate) -> Self {
        Self {
            extractor,
            store,
            date,
        }
    }

    /// Scrape the page and write the snapshot, then release the page.
    pub async fn run<P: CatalogPage>(&mut self, page: &mut P) -> Result<ScrapeReport, ScrapeError> {
        info!("🚀 Starting catalog scrape for {}", self.date);
        let result = self.scrape(page).await;

        if let Err(e) = page.release().await {
            warn!("Failed to release browser session: {}", e);
        }

        match result {
            Ok(report) => {
                info!(
                    "✅ Scrape finished: {} found, {} extracted, {} skipped",
                    report.found,
                    report.extracted(),
                    report.skipped.len()
                );
                Ok(report)
            }
            Err(e) => {
                error!("Scrape aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn scrape<P: CatalogPage>(&mut self, page: &mut P) -> Result<ScrapeReport, ScrapeError> {
        page.wait_until_ready().await?;
        let found = page.entry_count().await?;
        info!("Found {} catalog entries", found);

        let mut batch = CatalogBatch::new(self.date);
        let mut skipped = Vec::new();

        for index in 0..found {
            match self.extractor.extract(page, index).await {
                ItemOutcome::Extracted(details) => {
                    let record = batch.append(details);
                    info!("[{}/{}] {}", index + 1, found, record.title);
                }
                ItemOutcome::Skipped { index, reason } => {
                    skipped.push(SkippedEntry { index, reason });
                }
            }
        }

        let snapshot = batch.freeze();
        let snapshot_path = self.store.write(&snapshot)?;

        Ok(ScrapeReport {
            found,
            skipped,
            snapshot,
            snapshot_path,
        })
    }
}
