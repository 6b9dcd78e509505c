//! Repository for the persisted catalog table
//!
//! Every operation runs on a caller-supplied connection so the writer can
//! keep a whole reconciliation inside one transaction. The table name comes
//! from validated configuration and is interpolated as an identifier.

#![allow(clippy::uninlined_format_args)]

use crate::domain::{CatalogRecord, IdentityKey, SnapshotDate};
use crate::infrastructure::database_connection::StoreResult;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};
use tracing::debug;

/// Column list shared by inserts and reads, key first
const COLUMNS: &str = "identity_key, snapshot_date, title, rating, release_year, genre, duration, director, stars, short_description";

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    table: String,
}

impl CatalogRepository {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the destination table if it does not exist yet.
    pub async fn ensure_table(&self, conn: &mut AnyConnection) -> StoreResult<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                identity_key VARCHAR(255) PRIMARY KEY,
                snapshot_date VARCHAR(8),
                title VARCHAR(255),
                rating VARCHAR(10),
                release_year VARCHAR(50),
                genre VARCHAR(255),
                duration VARCHAR(10),
                director VARCHAR(255),
                stars TEXT,
                short_description TEXT
            )
            "#,
            self.table
        );
        sqlx::query(&sql).execute(&mut *conn).await?;
        debug!("Ensured table {}", self.table);
        Ok(())
    }

    pub async fn exists(&self, conn: &mut AnyConnection, key: IdentityKey) -> StoreResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE identity_key = ? LIMIT 1", self.table);
        let row = sqlx::query(&sql)
            .bind(key.to_string())
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn insert(&self, conn: &mut AnyConnection, record: &CatalogRecord) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.table, COLUMNS
        );
        sqlx::query(&sql)
            .bind(record.identity_key.to_string())
            .bind(record.snapshot_date.to_string())
            .bind(record.title.as_str())
            .bind(record.rating.as_str())
            .bind(record.release_year.as_str())
            .bind(record.genre.as_str())
            .bind(record.duration.as_str())
            .bind(record.director.as_str())
            .bind(record.stars.as_str())
            .bind(record.short_description.as_str())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Overwrite every attribute column of the row with the record's key.
    pub async fn update(&self, conn: &mut AnyConnection, record: &CatalogRecord) -> StoreResult<()> {
        let sql = format!(
            r#"
            UPDATE {}
            SET snapshot_date = ?, title = ?, rating = ?, release_year = ?, genre = ?,
                duration = ?, director = ?, stars = ?, short_description = ?
            WHERE identity_key = ?
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(record.snapshot_date.to_string())
            .bind(record.title.as_str())
            .bind(record.rating.as_str())
            .bind(record.release_year.as_str())
            .bind(record.genre.as_str())
            .bind(record.duration.as_str())
            .bind(record.director.as_str())
            .bind(record.stars.as_str())
            .bind(record.short_description.as_str())
            .bind(record.identity_key.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn find(
        &self,
        conn: &mut AnyConnection,
        key: IdentityKey,
    ) -> StoreResult<Option<CatalogRecord>> {
        let sql = format!("SELECT {} FROM {} WHERE identity_key = ?", COLUMNS, self.table);
        let row = sqlx::query(&sql)
            .bind(key.to_string())
            .fetch_optional(&mut *conn)
            .await?;
        row.as_ref().map(Self::record_from_row).transpose()
    }

    pub async fn count(&self, conn: &mut AnyConnection) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        let row = sqlx::query(&sql).fetch_one(&mut *conn).await?;
        Ok(row.try_get("total")?)
    }

    fn record_from_row(row: &AnyRow) -> StoreResult<CatalogRecord> {
        let decode_err = |column: &str, value: String| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: format!("unparseable value '{}'", value).into(),
        };

        let key: String = row.try_get("identity_key")?;
        let date: String = row.try_get("snapshot_date")?;

        Ok(CatalogRecord {
            identity_key: key
                .parse::<IdentityKey>()
                .map_err(|_| decode_err("identity_key", key.clone()))?,
            snapshot_date: date
                .parse::<SnapshotDate>()
                .map_err(|_| decode_err("snapshot_date", date.clone()))?,
            title: row.try_get("title")?,
            rating: row.try_get("rating")?,
            release_year: row.try_get("release_year")?,
            genre: row.try_get("genre")?,
            duration: row.try_get("duration")?,
            director: row.try_get("director")?,
            stars: row.try_get("stars")?,
            short_description: row.try_get("short_description")?,
        })
    }
}
