//! Command handlers behind the CLI
//!
//! Each handler wires configuration into the application layer and returns
//! a summary for the binary to print. `anyhow` is used from here outward.

pub mod catalog_commands;

pub use catalog_commands::{RunContext, SyncSummary, execute, load_snapshot, scrape_catalog, sync_catalog};
