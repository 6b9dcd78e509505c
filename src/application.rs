//! Application layer module
//!
//! Use cases that orchestrate the domain types over the infrastructure:
//! per-entry extraction, the scrape run, and snapshot reconciliation.

pub mod catalog_scraper;
pub mod item_extractor;
pub mod reconciliation_writer;

pub use catalog_scraper::{CatalogScraper, ScrapeError, ScrapeReport, SkippedEntry};
pub use item_extractor::{ItemExtractor, ItemOutcome, read_details};
pub use reconciliation_writer::{
    ReconcileError, ReconcileFailure, ReconcileReport, ReconciliationWriter,
};
