//! Infrastructure layer for the browser page, parsing, files and the store
//!
//! Configuration, logging, the catalog page capability and its WebDriver
//! implementation, detail panel parsing, snapshot files and SQL access.

pub mod catalog_page;
pub mod catalog_repository;
pub mod config; // Configuration constants and layered settings
pub mod database_connection;
pub mod logging; // Logging infrastructure
pub mod page_error;
pub mod parsing; // Detail panel selectors and parser
pub mod snapshot_store;
pub mod webdriver_page;

// Re-export commonly used items
pub use catalog_page::CatalogPage;
pub use catalog_repository::CatalogRepository;
pub use config::{AppConfig, ConfigError, imdb};
pub use database_connection::{DatabaseConnection, StoreError};
pub use logging::{LoggingGuard, init_logging, log_system_info};
pub use page_error::{PageError, PageResult};
pub use parsing::{DetailPanel, HtmlDetailPanel, PageLayout, PanelField, PanelParser};
pub use snapshot_store::{SnapshotError, SnapshotStore};
pub use webdriver_page::WebDriverCatalogPage;
