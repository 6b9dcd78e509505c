//! WebDriver-backed catalog page
//!
//! Drives a real browser through a WebDriver endpoint (chromedriver by
//! default). Panel fields are read by capturing the dialog's markup once and
//! resolving the configured selectors against it with [`PanelParser`].

#![allow(clippy::uninlined_format_args)]

use crate::infrastructure::catalog_page::CatalogPage;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::page_error::{PageError, PageResult};
use crate::infrastructure::parsing::{HtmlDetailPanel, PageLayout, PanelParser};
use async_trait::async_trait;
use std::time::Duration;
use thirtyfour::ChromiumLikeCapabilities;
use thirtyfour::prelude::*;
use tracing::{debug, info, warn};

/// XPath string literal for arbitrary text
fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        format!("\"{}\"", text)
    } else if !text.contains('\'') {
        format!("'{}'", text)
    } else {
        let parts: Vec<String> = text.split('"').map(|p| format!("\"{}\"", p)).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

fn heading_xpath(heading: &str) -> String {
    format!(
        "//h1[contains(normalize-space(.), {})]",
        xpath_literal(heading.trim())
    )
}

pub struct WebDriverCatalogPage {
    driver: Option<WebDriver>,
    config: ScraperConfig,
    layout: PageLayout,
    parser: PanelParser,
}

impl WebDriverCatalogPage {
    /// Start a browser session against the configured WebDriver endpoint.
    pub async fn launch(config: &ScraperConfig, layout: &PageLayout) -> PageResult<Self> {
        let parser = PanelParser::new(&layout.panel)?;

        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps)
            .await
            .map_err(|e| PageError::SessionStart {
                message: format!("{} ({})", e, config.webdriver_url),
            })?;

        info!("🚀 Browser session started via {}", config.webdriver_url);
        Ok(Self {
            driver: Some(driver),
            config: config.clone(),
            layout: layout.clone(),
            parser,
        })
    }

    fn driver(&self) -> PageResult<&WebDriver> {
        self.driver
            .as_ref()
            .ok_or_else(|| PageError::unexpected("browser session already released"))
    }

    async fn wait_for_css(
        &self,
        selector: &str,
        what: &str,
        timeout: Duration,
    ) -> PageResult<WebElement> {
        self.driver()?
            .query(By::Css(selector))
            .wait(timeout, self.config.poll_interval())
            .and_displayed()
            .first()
            .await
            .map_err(|e| {
                debug!("Waiting for {} failed: {}", what, e);
                PageError::timeout(what, timeout)
            })
    }
}

#[async_trait]
impl CatalogPage for WebDriverCatalogPage {
    type Panel = HtmlDetailPanel;

    async fn wait_until_ready(&mut self) -> PageResult<()> {
        let url = self.config.target_url.clone();
        self.driver()?
            .goto(url.as_str())
            .await
            .map_err(|e| PageError::Navigation {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let timeout = self.config.ready_timeout();
        self.driver()?
            .query(By::XPath(heading_xpath(&self.config.ready_heading)))
            .wait(timeout, self.config.poll_interval())
            .first()
            .await
            .map_err(|_| PageError::timeout(format!("heading '{}'", self.config.ready_heading), timeout))?;

        info!("📄 Catalog page ready: {}", url);
        Ok(())
    }

    async fn entry_count(&mut self) -> PageResult<usize> {
        let entries = self
            .driver()?
            .find_all(By::Css(self.layout.entry_selector.as_str()))
            .await?;
        Ok(entries.len())
    }

    async fn scroll_by(&mut self, dy: i64) -> PageResult<()> {
        self.driver()?
            .execute(
                "window.scrollBy(0, arguments[0]);",
                vec![serde_json::json!(dy)],
            )
            .await?;
        Ok(())
    }

    async fn open_detail(&mut self, index: usize) -> PageResult<()> {
        let timeout = self.config.item_timeout();
        let xpath = self.layout.info_button_xpath_for(index);

        let button = self
            .driver()?
            .query(By::XPath(xpath.as_str()))
            .wait(timeout, self.config.poll_interval())
            .first()
            .await
            .map_err(|_| PageError::ElementMissing {
                selector: xpath.clone(),
            })?;
        button.scroll_into_view().await?;
        button.click().await?;

        let dialog_selector = self.layout.dialog_selector.clone();
        self.wait_for_css(&dialog_selector, "detail dialog", timeout)
            .await?;
        Ok(())
    }

    async fn detail_panel(&mut self) -> PageResult<HtmlDetailPanel> {
        let dialog = self
            .wait_for_css(
                &self.layout.dialog_selector,
                "detail dialog",
                self.config.item_timeout(),
            )
            .await?;
        let html = dialog.outer_html().await?;
        Ok(self.parser.parse(&html))
    }

    async fn close_detail(&mut self) -> PageResult<()> {
        let timeout = self.config.item_timeout();
        let close = self
            .wait_for_css(&self.layout.close_button_selector, "close button", timeout)
            .await?;
        close.click().await?;

        let closed = self
            .driver()?
            .query(By::Css(self.layout.dialog_selector.as_str()))
            .wait(timeout, self.config.poll_interval())
            .and_displayed()
            .not_exists()
            .await?;
        if !closed {
            return Err(PageError::timeout("detail dialog to close", timeout));
        }
        Ok(())
    }

    async fn release(&mut self) -> PageResult<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
            info!("Browser session released");
        } else {
            warn!("Browser session release requested twice");
        }
        Ok(())
    }
}
