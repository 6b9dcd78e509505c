//! Catalog records and the per-run batch that accumulates them

use super::identity_key::{IdentityKey, KeyGenerator};
use super::snapshot_date::SnapshotDate;
use serde::{Deserialize, Serialize};

/// Normalized fields read from one entry's detail panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    pub rating: String,
    pub release_year: String,
    pub genre: String,
    pub duration: String,
    pub director: String,
    pub stars: String,
    pub short_description: String,
}

/// One extracted catalog entry stamped with its run date and identity key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub snapshot_date: SnapshotDate,
    pub title: String,
    pub rating: String,
    pub release_year: String,
    pub genre: String,
    pub duration: String,
    pub director: String,
    pub stars: String,
    pub short_description: String,
    pub identity_key: IdentityKey,
}

impl CatalogRecord {
    pub fn new(snapshot_date: SnapshotDate, details: MovieDetails) -> Self {
        let MovieDetails {
            title,
            rating,
            release_year,
            genre,
            duration,
            director,
            stars,
            short_description,
        } = details;

        let mut record = Self {
            snapshot_date,
            title,
            rating,
            release_year,
            genre,
            duration,
            director,
            stars,
            short_description,
            identity_key: IdentityKey::from_u128(0),
        };
        record.identity_key = record.derive_identity_key();
        record
    }

    /// Key over `(snapshot_date, title, genre, release_year)`, in that order.
    pub fn derive_identity_key(&self) -> IdentityKey {
        let date = self.snapshot_date.to_string();
        KeyGenerator::generate(&[
            date.as_str(),
            self.title.as_str(),
            self.genre.as_str(),
            self.release_year.as_str(),
        ])
    }

    pub fn details(&self) -> MovieDetails {
        MovieDetails {
            title: self.title.clone(),
            rating: self.rating.clone(),
            release_year: self.release_year.clone(),
            genre: self.genre.clone(),
            duration: self.duration.clone(),
            director: self.director.clone(),
            stars: self.stars.clone(),
            short_description: self.short_description.clone(),
        }
    }
}

/// Mutable accumulator owned by a single scrape run
#[derive(Debug, Clone)]
pub struct CatalogBatch {
    snapshot_date: SnapshotDate,
    records: Vec<CatalogRecord>,
}

impl CatalogBatch {
    pub const fn new(snapshot_date: SnapshotDate) -> Self {
        Self {
            snapshot_date,
            records: Vec::new(),
        }
    }

    pub const fn snapshot_date(&self) -> SnapshotDate {
        self.snapshot_date
    }

    /// Append an entry in enumeration order and re-stamp every key.
    pub fn append(&mut self, details: MovieDetails) -> &CatalogRecord {
        self.records.push(CatalogRecord::new(self.snapshot_date, details));
        self.restamp_identity_keys();
        &self.records[self.records.len() - 1]
    }

    /// Recompute `identity_key` for every record. Idempotent.
    pub fn restamp_identity_keys(&mut self) {
        for record in &mut self.records {
            record.identity_key = record.derive_identity_key();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// End of run: no further appends.
    pub fn freeze(self) -> CatalogSnapshot {
        CatalogSnapshot {
            snapshot_date: self.snapshot_date,
            records: self.records,
        }
    }
}

/// Frozen batch handed by value from the scraper to the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    snapshot_date: SnapshotDate,
    records: Vec<CatalogRecord>,
}

impl CatalogSnapshot {
    /// Rebuild a snapshot from records read back from storage.
    pub fn from_records(snapshot_date: SnapshotDate, records: Vec<CatalogRecord>) -> Self {
        Self {
            snapshot_date,
            records,
        }
    }

    pub const fn snapshot_date(&self) -> SnapshotDate {
        self.snapshot_date
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::details;
    use super::*;
    use chrono::NaiveDate;

    fn date() -> SnapshotDate {
        SnapshotDate::from_naive(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
    }

    #[test]
    fn test_key_covers_date_title_genre_year() {
        let record = CatalogRecord::new(date(), details("The Shawshank Redemption", "1994"));
        let expected = KeyGenerator::generate(&["20250301", "The Shawshank Redemption", "Drama", "1994"]);
        assert_eq!(record.identity_key, expected);
    }

    #[test]
    fn test_key_ignores_non_identity_fields() {
        let a = CatalogRecord::new(date(), details("Heat", "1995"));
        let mut changed = details("Heat", "1995");
        changed.rating = "8.3".to_string();
        changed.stars = "Al Pacino".to_string();
        let b = CatalogRecord::new(date(), changed);
        assert_eq!(a.identity_key, b.identity_key);
    }

    #[test]
    fn test_append_keeps_order_and_restamps() {
        let mut batch = CatalogBatch::new(date());
        batch.append(details("A", "2001"));
        batch.append(details("B", "2002"));
        let keys: Vec<_> = batch.records().iter().map(|r| r.identity_key).collect();
        batch.restamp_identity_keys();
        let again: Vec<_> = batch.records().iter().map(|r| r.identity_key).collect();

        assert_eq!(keys, again);
        assert_eq!(batch.records()[0].title, "A");
        assert_eq!(batch.records()[1].title, "B");
    }

    #[test]
    fn test_freeze_preserves_records() {
        let mut batch = CatalogBatch::new(date());
        batch.append(details("A", "2001"));
        let records = batch.records().to_vec();
        let snapshot = batch.freeze();
        assert_eq!(snapshot.records(), records.as_slice());
        assert_eq!(snapshot.snapshot_date(), date());
    }
}
