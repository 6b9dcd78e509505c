//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate, later sources winning:
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. Optional TOML file (`--config`, or `catalog-sync.toml` if present)
//! 3. `CATALOG_SYNC_*` environment variables (`__` separates sections)
//! 4. Legacy `singlestore_*` store credentials

#![allow(clippy::uninlined_format_args)]

use crate::infrastructure::parsing::config::{PageLayout, POSITION_PLACEHOLDER};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Scrape target constants
pub mod imdb {
    pub const TOP_250_URL: &str = "https://www.imdb.com/chart/top/?ref_=nv_mv_250";
    pub const READY_HEADING: &str = "IMDb Top 250 Movies";
    pub const ENTRY_SELECTOR: &str = "li.ipc-metadata-list-summary-item";
    pub const INFO_BUTTON_XPATH: &str = "//*[@id=\"__next\"]/main/div/div[3]/section/div/div[2]/div/ul/li[{position}]/div/div/div/div/div[3]/button";
    pub const DIALOG_SELECTOR: &str = "div[role=\"dialog\"]";
    pub const CLOSE_BUTTON_SELECTOR: &str = "button[aria-label=\"Close Prompt\"]";
    pub const CAST_LABEL: &str = "Stars";
}

/// Default values shared by config structs and tests
pub mod defaults {
    pub const WEBDRIVER_URL: &str = "http://localhost:9515";
    pub const HEADLESS: bool = false;

    /// Page readiness wait, matching the browser launch budget
    pub const READY_TIMEOUT_MS: u64 = 20_000;
    pub const ITEM_TIMEOUT_MS: u64 = 5_000;
    pub const POLL_INTERVAL_MS: u64 = 250;
    pub const SETTLE_DELAY_MS: u64 = 1_000;

    pub const FIRST_SCROLL: (i64, i64) = (0, 70);
    pub const SECOND_SCROLL: (i64, i64) = (50, 100);

    pub const STORE_HOST: &str = "127.0.0.1";
    pub const STORE_PORT: u16 = 3306;
    pub const STORE_USER: &str = "root";
    pub const STORE_DATABASE: &str = "movies";
    pub const STORE_TABLE: &str = "imdb_top_250";

    pub const RAW_DIR: &str = ".data/raw_data";
    pub const LOG_DIR: &str = ".data/logs";

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_LEVEL: &str = "warn";

    /// Asia/Kuala_Lumpur
    pub const UTC_OFFSET_HOURS: i32 = 8;

    pub const CONFIG_FILE_STEM: &str = "catalog-sync";
    pub const ENV_PREFIX: &str = "CATALOG_SYNC";
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub page: PageLayout,
    pub store: StoreConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
    pub clock: ClockConfig,
}

/// Half-open pixel range `[min, max)` for a random scroll step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRange {
    pub min: i64,
    pub max: i64,
}

impl ScrollRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub const fn is_empty(self) -> bool {
        self.min >= self.max
    }
}

/// Browser session and pacing settings for the scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Catalog page URL
    pub target_url: String,

    /// WebDriver endpoint (chromedriver, geckodriver or a Selenium grid)
    pub webdriver_url: String,

    pub headless: bool,

    /// Heading text that confirms the catalog page has loaded
    pub ready_heading: String,

    pub ready_timeout_ms: u64,
    pub item_timeout_ms: u64,
    pub poll_interval_ms: u64,

    /// Pause after closing a panel before the next entry
    pub settle_delay_ms: u64,

    pub first_scroll: ScrollRange,
    pub second_scroll: ScrollRange,

    /// Leading label stripped from the cast field
    pub cast_label: String,
}

impl ScraperConfig {
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub const fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: imdb::TOP_250_URL.to_string(),
            webdriver_url: defaults::WEBDRIVER_URL.to_string(),
            headless: defaults::HEADLESS,
            ready_heading: imdb::READY_HEADING.to_string(),
            ready_timeout_ms: defaults::READY_TIMEOUT_MS,
            item_timeout_ms: defaults::ITEM_TIMEOUT_MS,
            poll_interval_ms: defaults::POLL_INTERVAL_MS,
            settle_delay_ms: defaults::SETTLE_DELAY_MS,
            first_scroll: ScrollRange::new(defaults::FIRST_SCROLL.0, defaults::FIRST_SCROLL.1),
            second_scroll: ScrollRange::new(defaults::SECOND_SCROLL.0, defaults::SECOND_SCROLL.1),
            cast_label: imdb::CAST_LABEL.to_string(),
        }
    }
}

/// Persistent store connection parameters
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Destination table name
    pub table: String,

    /// Full connection URL; overrides host/port/user/password/database when set
    pub database_url: Option<String>,
}

impl StoreConfig {
    /// Connection URL for the store, built from the parts unless overridden.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        let invalid = |what: &str| ConfigError::Validation {
            message: format!("store {} cannot be used in a connection URL", what),
        };

        let mut url = url::Url::parse("mysql://localhost").map_err(|_| invalid("scheme"))?;
        url.set_host(Some(&self.host)).map_err(|_| invalid("host"))?;
        url.set_port(Some(self.port)).map_err(|()| invalid("port"))?;
        url.set_username(&self.user).map_err(|()| invalid("user"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|()| invalid("password"))?;
        }
        url.set_path(&self.database);
        Ok(url.to_string())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: defaults::STORE_HOST.to_string(),
            port: defaults::STORE_PORT,
            user: defaults::STORE_USER.to_string(),
            password: String::new(),
            database: defaults::STORE_DATABASE.to_string(),
            table: defaults::STORE_TABLE.to_string(),
            database_url: None,
        }
    }
}

/// Snapshot and log file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub raw_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(defaults::RAW_DIR),
            log_dir: PathBuf::from(defaults::LOG_DIR),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Console level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Level written to the dated log file
    pub file_level: String,

    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            file_level: defaults::LOG_FILE_LEVEL.to_string(),
            console_output: true,
            file_output: true,
        }
    }
}

/// Local clock used for the run date and log timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    pub utc_offset_hours: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: defaults::UTC_OFFSET_HOURS,
        }
    }
}

impl ClockConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| ConfigError::Validation {
            message: format!("utc_offset_hours {} is out of range", self.utc_offset_hours),
        })
    }
}

/// Legacy variable names for store credentials, mapped to config keys
const LEGACY_STORE_VARS: [(&str, &str); 5] = [
    ("singlestore_host", "store.host"),
    ("singlestore_user", "store.user"),
    ("singlestore_password", "store.password"),
    ("singlestore_port", "store.port"),
    ("singlestore_database", "store.database"),
];

fn legacy_var(name: &str) -> Option<String> {
    std::env::var(name)
        .or_else(|_| std::env::var(name.to_ascii_uppercase()))
        .ok()
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(defaults::CONFIG_FILE_STEM).required(false),
        };

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_STORE_VARS {
            builder = builder.set_override_option(key, legacy_var(var))?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a single file on top of the defaults, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(path))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| Err(ConfigError::Validation { message });

        let scraper = &self.scraper;
        for (name, value) in [
            ("ready_timeout_ms", scraper.ready_timeout_ms),
            ("item_timeout_ms", scraper.item_timeout_ms),
            ("poll_interval_ms", scraper.poll_interval_ms),
        ] {
            if value == 0 {
                return fail(format!("scraper.{} must be greater than 0", name));
            }
        }

        for (name, range) in [
            ("first_scroll", scraper.first_scroll),
            ("second_scroll", scraper.second_scroll),
        ] {
            if range.is_empty() {
                return fail(format!("scraper.{} must satisfy min < max", name));
            }
        }

        if !self.page.info_button_xpath.contains(POSITION_PLACEHOLDER) {
            return fail(format!(
                "page.info_button_xpath must contain the {} placeholder",
                POSITION_PLACEHOLDER
            ));
        }

        for (name, value) in [
            ("entry_selector", &self.page.entry_selector),
            ("dialog_selector", &self.page.dialog_selector),
            ("close_button_selector", &self.page.close_button_selector),
        ] {
            if value.trim().is_empty() {
                return fail(format!("page.{} must not be empty", name));
            }
        }

        for (name, list) in self.page.panel.entries() {
            if list.is_empty() {
                return fail(format!("page.panel.{} needs at least one selector", name));
            }
        }

        if !is_sql_identifier(&self.store.table) {
            return fail(format!(
                "store.table '{}' must be a plain identifier (letters, digits, underscore)",
                self.store.table
            ));
        }

        if !(-14..=14).contains(&self.clock.utc_offset_hours) {
            return fail(format!(
                "clock.utc_offset_hours {} must be within -14..=14",
                self.clock.utc_offset_hours
            ));
        }

        Ok(())
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.store.table, "imdb_top_250");
        assert_eq!(config.clock.offset().unwrap().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[scraper]
headless = true
settle_delay_ms = 0

[store]
host = "db.internal"
port = 3307
table = "top_movies"

[clock]
utc_offset_hours = 0
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(config.scraper.headless);
        assert_eq!(config.scraper.settle_delay_ms, 0);
        assert_eq!(config.scraper.item_timeout_ms, defaults::ITEM_TIMEOUT_MS);
        assert_eq!(config.store.host, "db.internal");
        assert_eq!(config.store.port, 3307);
        assert_eq!(config.store.table, "top_movies");
        assert_eq!(config.clock.utc_offset_hours, 0);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let mut config = AppConfig::default();
        config.store.table = "movies; DROP TABLE x".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_empty_scroll_range() {
        let mut config = AppConfig::default();
        config.scraper.second_scroll = ScrollRange::new(10, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_xpath_without_position() {
        let mut config = AppConfig::default();
        config.page.info_button_xpath = "//button".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_connection_url_from_parts() {
        let store = StoreConfig {
            host: "svc-123.singlestore.com".to_string(),
            port: 3333,
            user: "admin".to_string(),
            password: "p@ss/word".to_string(),
            database: "movies".to_string(),
            ..StoreConfig::default()
        };
        let url = store.connection_url().unwrap();
        assert!(url.starts_with("mysql://admin:"));
        assert!(url.contains("@svc-123.singlestore.com:3333/movies"));
        assert!(!url.contains("p@ss/word"));
    }

    #[test]
    fn test_connection_url_override() {
        let store = StoreConfig {
            database_url: Some("sqlite::memory:".to_string()),
            ..StoreConfig::default()
        };
        assert_eq!(store.connection_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn test_debug_redacts_password() {
        let store = StoreConfig {
            password: "hunter2".to_string(),
            ..StoreConfig::default()
        };
        assert!(!format!("{store:?}").contains("hunter2"));
    }
}
