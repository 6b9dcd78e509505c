//! Snapshot reconciliation against the persistent table
//!
//! Each record is upserted by identity key with an explicit existence check,
//! all inside one transaction that commits after the last row. A failed run
//! leaves the table untouched and reports how far it got.

#![allow(clippy::uninlined_format_args)]

use crate::domain::{CatalogSnapshot, SnapshotDate};
use crate::infrastructure::catalog_repository::CatalogRepository;
use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::database_connection::{DatabaseConnection, StoreError, StoreResult};
use crate::infrastructure::snapshot_store::{SnapshotError, SnapshotStore};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Rows written by a completed reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aborted reconciliation with the counters reached before the failure.
///
/// The counts describe work done inside the uncommitted transaction; the
/// table itself is unchanged.
#[derive(Error, Debug)]
#[error("Reconciliation failed after {inserted} inserts and {updated} updates: {error}")]
pub struct ReconcileFailure {
    #[source]
    pub error: ReconcileError,
    pub inserted: usize,
    pub updated: usize,
}

impl ReconcileFailure {
    fn new(error: impl Into<ReconcileError>, progress: ReconcileReport) -> Self {
        Self {
            error: error.into(),
            inserted: progress.inserted,
            updated: progress.updated,
        }
    }
}

pub struct ReconciliationWriter {
    database_url: String,
    repository: CatalogRepository,
}

impl ReconciliationWriter {
    pub fn new(database_url: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            repository: CatalogRepository::new(table),
        }
    }

    pub fn from_config(store: &StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(store.connection_url()?, store.table.clone()))
    }

    /// Load a snapshot file fully, then reconcile it.
    pub async fn run(&self, path: &Path, date: SnapshotDate) -> Result<ReconcileReport, ReconcileFailure> {
        let snapshot = SnapshotStore::read_from(path, date).map_err(|e| {
            error!("Cannot load snapshot {:?}: {}", path, e);
            ReconcileFailure::new(e, ReconcileReport::default())
        })?;
        self.apply(snapshot).await
    }

    /// Upsert every record of `snapshot` in order and commit once.
    pub async fn apply(&self, snapshot: CatalogSnapshot) -> Result<ReconcileReport, ReconcileFailure> {
        let mut progress = ReconcileReport::default();
        info!(
            "Reconciling {} records into {}",
            snapshot.len(),
            self.repository.table()
        );

        let mut db = DatabaseConnection::connect(&self.database_url)
            .await
            .map_err(|e| {
                error!("Store unreachable: {}", e);
                ReconcileFailure::new(e, progress)
            })?;

        let result = self.reconcile(&mut db, &snapshot, &mut progress).await;

        if let Err(e) = db.close().await {
            warn!("Failed to close store connection: {}", e);
        }

        match result {
            Ok(()) => {
                info!(
                    "✅ Reconciliation committed: {} inserted, {} updated",
                    progress.inserted, progress.updated
                );
                Ok(progress)
            }
            Err(e) => {
                let failure = ReconcileFailure::new(e, progress);
                error!("{}", failure);
                Err(failure)
            }
        }
    }

    async fn reconcile(
        &self,
        db: &mut DatabaseConnection,
        snapshot: &CatalogSnapshot,
        progress: &mut ReconcileReport,
    ) -> StoreResult<()> {
        self.repository.ensure_table(db.connection()).await?;

        let mut tx = db.begin().await?;
        for record in snapshot.records() {
            if self.repository.exists(&mut tx, record.identity_key).await? {
                self.repository.update(&mut tx, record).await?;
                progress.updated += 1;
                debug!("Updated {} ({})", record.identity_key, record.title);
            } else {
                self.repository.insert(&mut tx, record).await?;
                progress.inserted += 1;
                debug!("Inserted {} ({})", record.identity_key, record.title);
            }
        }
        tx.commit().await?;
        Ok(())
    }
}
