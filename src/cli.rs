//! Command-line interface for the `catalog-sync` binary.

use crate::domain::SnapshotDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "catalog-sync",
    version,
    about = "Scrape the Top 250 movie chart and reconcile it into a SQL store"
)]
pub struct Cli {
    /// TOML configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run date override, YYYYMMDD (defaults to today in the configured offset)
    #[arg(long, global = true)]
    pub date: Option<SnapshotDate>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape the catalog page and write the run's snapshot
    Scrape,

    /// Reconcile a snapshot into the store
    Load {
        /// Snapshot file (defaults to the run date's snapshot)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Scrape, then load the snapshot just written
    Sync,
}

impl Cli {
    /// Subcommand to run; `sync` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sync)
    }
}
