//! Catalog page capability
//!
//! The scrape pipeline drives the page only through this trait. The browser
//! implementation lives in [`crate::infrastructure::webdriver_page`]; tests
//! substitute scripted pages.

use crate::infrastructure::page_error::PageResult;
use crate::infrastructure::parsing::DetailPanel;
use async_trait::async_trait;

/// A loaded catalog page whose entries expose a detail panel one at a time
#[async_trait]
pub trait CatalogPage: Send {
    type Panel: DetailPanel + Send;

    /// Navigate to the catalog and wait for its heading.
    async fn wait_until_ready(&mut self) -> PageResult<()>;

    /// Number of entries present in the initial load
    async fn entry_count(&mut self) -> PageResult<usize>;

    /// Scroll the viewport vertically by `dy` pixels.
    async fn scroll_by(&mut self, dy: i64) -> PageResult<()>;

    /// Activate the "more info" control of entry `index` (0-based) and wait
    /// for its panel to become visible.
    async fn open_detail(&mut self, index: usize) -> PageResult<()>;

    /// Capture the fields of the panel currently open.
    async fn detail_panel(&mut self) -> PageResult<Self::Panel>;

    /// Close the open panel through its close control.
    async fn close_detail(&mut self) -> PageResult<()>;

    /// End the browser session. Safe to call more than once.
    async fn release(&mut self) -> PageResult<()>;
}
