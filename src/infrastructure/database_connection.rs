// Store connection management
// One exclusive connection per run through sqlx's Any driver, so the same
// SQL path serves MySQL-wire stores (SingleStore, MySQL) and SQLite.

use crate::infrastructure::config::ConfigError;
use sqlx::any::install_default_drivers;
use sqlx::{Any, AnyConnection, Connection, Transaction};
use std::path::Path;
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot connect to store at {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Store query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Store configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type StoreResult<T> = Result<T, StoreError>;

static INSTALL_DRIVERS: Once = Once::new();

/// Connection URL with credentials removed, for logs and errors
pub fn redact_url(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut url) if url.has_host() => {
            let _ = url.set_password(None);
            url.to_string()
        }
        _ => database_url
            .split('?')
            .next()
            .unwrap_or(database_url)
            .to_string(),
    }
}

/// File path of a SQLite URL, `None` for in-memory or non-SQLite URLs
fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && !path.starts_with(":memory:")).then_some(path)
}

pub struct DatabaseConnection {
    conn: AnyConnection,
    target: String,
}

impl DatabaseConnection {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        INSTALL_DRIVERS.call_once(install_default_drivers);
        let target = redact_url(database_url);

        // SQLite creates the file itself (mode=rwc) but not its directory
        if let Some(parent) = sqlite_file_path(database_url).and_then(|p| Path::new(p).parent()) {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Connect {
                        target: target.clone(),
                        source: sqlx::Error::Io(e),
                    })?;
            }
        }

        debug!("Connecting to store at {}", target);
        let conn = AnyConnection::connect(database_url)
            .await
            .map_err(|source| StoreError::Connect {
                target: target.clone(),
                source,
            })?;

        info!("🔗 Connected to store at {} ({})", target, conn.backend_name());
        Ok(Self { conn, target })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.conn
    }

    /// Start the run's single transaction; rolled back if dropped uncommitted.
    pub async fn begin(&mut self) -> StoreResult<Transaction<'_, Any>> {
        Ok(self.conn.begin().await?)
    }

    pub async fn close(self) -> StoreResult<()> {
        self.conn.close().await?;
        debug!("Closed store connection to {}", self.target);
        Ok(())
    }
}
