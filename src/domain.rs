//! Domain module - catalog records, identity keys and field normalization
//!
//! Everything here is pure and free of I/O; the infrastructure and
//! application layers build on these types.

pub mod catalog_record;
pub mod identity_key;
pub mod normalizer;
pub mod snapshot_date;

pub use catalog_record::{CatalogBatch, CatalogRecord, CatalogSnapshot, MovieDetails};
pub use identity_key::{IdentityKey, KeyGenerator};
pub use snapshot_date::{SnapshotDate, SnapshotDateError};
