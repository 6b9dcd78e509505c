//! Intermediate snapshot persistence
//!
//! One CSV file per run date under the raw data directory. Files are
//! written to a temporary sibling and renamed into place, so a reader never
//! sees a half-written snapshot.

#![allow(clippy::uninlined_format_args)]

use crate::domain::{CatalogRecord, CatalogSnapshot, IdentityKey, SnapshotDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Column order of the snapshot file
pub const SNAPSHOT_HEADER: [&str; 10] = [
    "snapshot_date",
    "title",
    "rating",
    "release_year",
    "genre",
    "duration",
    "director",
    "stars",
    "short_description",
    "identity_key",
];

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Snapshot CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Snapshot {path:?} has unexpected header: {found:?}")]
    Header { path: PathBuf, found: Vec<String> },

    #[error("Snapshot row {row}: invalid {field} '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRow {
    snapshot_date: String,
    title: String,
    rating: String,
    release_year: String,
    genre: String,
    duration: String,
    director: String,
    stars: String,
    short_description: String,
    identity_key: String,
}

impl From<&CatalogRecord> for SnapshotRow {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            snapshot_date: record.snapshot_date.to_string(),
            title: record.title.clone(),
            rating: record.rating.clone(),
            release_year: record.release_year.clone(),
            genre: record.genre.clone(),
            duration: record.duration.clone(),
            director: record.director.clone(),
            stars: record.stars.clone(),
            short_description: record.short_description.clone(),
            identity_key: record.identity_key.to_string(),
        }
    }
}

impl SnapshotRow {
    fn into_record(self, row: usize) -> SnapshotResult<CatalogRecord> {
        let snapshot_date = self
            .snapshot_date
            .parse::<SnapshotDate>()
            .map_err(|_| SnapshotError::InvalidField {
                row,
                field: "snapshot_date",
                value: self.snapshot_date.clone(),
            })?;
        let stored_key = self
            .identity_key
            .parse::<IdentityKey>()
            .map_err(|_| SnapshotError::InvalidField {
                row,
                field: "identity_key",
                value: self.identity_key.clone(),
            })?;

        let mut record = CatalogRecord {
            snapshot_date,
            title: self.title,
            rating: self.rating,
            release_year: self.release_year,
            genre: self.genre,
            duration: self.duration,
            director: self.director,
            stars: self.stars,
            short_description: self.short_description,
            identity_key: stored_key,
        };

        let derived = record.derive_identity_key();
        if derived != stored_key {
            warn!(
                "Snapshot row {} ({}): stored key {} differs from derived key {}, using derived",
                row, record.title, stored_key, derived
            );
            record.identity_key = derived;
        }
        Ok(record)
    }
}

/// Reads and writes dated snapshot files under one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    raw_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    /// `<raw_dir>/top_250_movies_<YYYYMMDD>.csv`
    pub fn path_for(&self, date: SnapshotDate) -> PathBuf {
        self.raw_dir.join(format!("top_250_movies_{}.csv", date))
    }

    /// Write the snapshot for its run date, replacing any earlier file.
    pub fn write(&self, snapshot: &CatalogSnapshot) -> SnapshotResult<PathBuf> {
        let path = self.path_for(snapshot.snapshot_date());
        std::fs::create_dir_all(&self.raw_dir).map_err(|source| SnapshotError::Io {
            path: self.raw_dir.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp_path)?;
            writer.write_record(SNAPSHOT_HEADER)?;
            for record in snapshot.records() {
                writer.serialize(SnapshotRow::from(record))?;
            }
            writer.flush().map_err(|source| SnapshotError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        }

        std::fs::rename(&tmp_path, &path).map_err(|source| SnapshotError::Io {
            path: path.clone(),
            source,
        })?;

        info!("💾 Saved {} records to {:?}", snapshot.len(), path);
        Ok(path)
    }

    /// Read the snapshot written for `date`.
    pub fn read(&self, date: SnapshotDate) -> SnapshotResult<CatalogSnapshot> {
        Self::read_from(&self.path_for(date), date)
    }

    /// Read a snapshot file in full, re-deriving every identity key.
    pub fn read_from(path: &Path, date: SnapshotDate) -> SnapshotResult<CatalogSnapshot> {
        let file = std::fs::File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.iter().ne(SNAPSHOT_HEADER.iter().copied()) {
            return Err(SnapshotError::Header {
                path: path.to_path_buf(),
                found: headers.iter().map(str::to_string).collect(),
            });
        }

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<SnapshotRow>().enumerate() {
            let record = row?.into_record(index + 1)?;
            if record.snapshot_date != date {
                debug!(
                    "Snapshot row {} carries date {} (run date {})",
                    index + 1,
                    record.snapshot_date,
                    date
                );
            }
            records.push(record);
        }

        info!("📖 Read {} records from {:?}", records.len(), path);
        Ok(CatalogSnapshot::from_records(date, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogBatch;
    use crate::domain::catalog_record::fixtures::details;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date() -> SnapshotDate {
        SnapshotDate::from_naive(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    }

    fn sample_snapshot() -> CatalogSnapshot {
        let mut batch = CatalogBatch::new(date());
        batch.append(details("The Shawshank Redemption", "1994"));
        let mut tricky = details("Léon: The Professional", "1994");
        tricky.short_description = "A hitman, \"Léon\", takes in\na girl.".to_string();
        tricky.stars = "Jean Reno, Gary Oldman, Natalie Portman".to_string();
        batch.append(tricky);
        batch.freeze()
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("raw"));
        let snapshot = sample_snapshot();

        let path = store.write(&snapshot).unwrap();
        assert_eq!(path, store.path_for(date()));
        assert!(path.ends_with("top_250_movies_20250301.csv"));
        assert!(!path.with_extension("csv.tmp").exists());

        let reloaded = store.read(date()).unwrap();
        assert_eq!(reloaded, snapshot);
    }

    #[test]
    fn test_empty_snapshot_still_has_header() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let path = store.write(&CatalogBatch::new(date()).freeze()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), SNAPSHOT_HEADER.join(","));
        assert!(store.read(date()).unwrap().is_empty());
    }

    #[test]
    fn test_stale_key_is_rederived() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let snapshot = sample_snapshot();
        let path = store.write(&snapshot).unwrap();

        let written_key = snapshot.records()[0].identity_key.to_string();
        let text = std::fs::read_to_string(&path).unwrap().replacen(&written_key, "42", 1);
        std::fs::write(&path, text).unwrap();

        let reloaded = store.read(date()).unwrap();
        assert_eq!(reloaded.records()[0].identity_key.to_string(), written_key);
    }

    #[test]
    fn test_rejects_foreign_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "title,year\nHeat,1995\n").unwrap();
        assert!(matches!(
            SnapshotStore::read_from(&path, date()),
            Err(SnapshotError::Header { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(matches!(store.read(date()), Err(SnapshotError::Io { .. })));
    }
}
