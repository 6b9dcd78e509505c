//! Test utilities for catalog-sync
//!
//! Scripted stand-ins for the browser page and its detail panel, plus
//! SQLite store helpers, shared by unit and integration tests.

use crate::infrastructure::catalog_page::CatalogPage;
use crate::infrastructure::page_error::{PageError, PageResult};
use crate::infrastructure::parsing::{DetailPanel, PanelField};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Detail panel backed by a field map
#[derive(Debug, Clone, Default)]
pub struct MapPanel {
    values: HashMap<PanelField, String>,
}

impl MapPanel {
    /// Panel with every field populated with plausible raw text
    pub fn complete(title: &str, year: &str) -> Self {
        Self::default()
            .with(PanelField::Title, title)
            .with(PanelField::Rating, "8.5")
            .with(PanelField::ReleaseYear, year)
            .with(PanelField::Duration, "2h 10min")
            .with(PanelField::Genre, "Drama")
            .with(PanelField::Director, "Jane Director")
            .with(PanelField::Stars, "StarsAnn LeadBob Support")
            .with(PanelField::ShortDescription, "A story worth telling.")
    }

    pub fn with(mut self, field: PanelField, value: &str) -> Self {
        self.values.insert(field, value.to_string());
        self
    }

    pub fn without(mut self, field: PanelField) -> Self {
        self.values.remove(&field);
        self
    }
}

impl DetailPanel for MapPanel {
    fn field(&self, field: PanelField) -> PageResult<String> {
        self.values
            .get(&field)
            .cloned()
            .ok_or_else(|| PageError::field_missing(field.name(), &[]))
    }
}

/// Catalog page that replays a fixed script of entries.
///
/// An entry of `None` has no reachable info button. Opening a second panel
/// while one is open is rejected, so tests catch out-of-order driving.
#[derive(Debug, Default)]
pub struct ScriptedPage {
    entries: Vec<Option<MapPanel>>,
    ready_failure: Option<String>,
    dialog_timeouts: HashSet<usize>,
    stuck_closes: HashSet<usize>,
    open: Option<usize>,
    pub opened: Vec<usize>,
    pub scrolls: Vec<i64>,
    pub closes: usize,
    pub released: bool,
}

impl ScriptedPage {
    pub fn new(entries: Vec<Option<MapPanel>>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// `count` complete entries titled `Movie 1`, `Movie 2`, ...
    pub fn with_movies(count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|n| Some(MapPanel::complete(&format!("Movie {}", n), &(1990 + n).to_string())))
                .collect(),
        )
    }

    /// Page whose heading never appears
    pub fn unreachable(message: &str) -> Self {
        Self {
            ready_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn set_entry(&mut self, index: usize, entry: Option<MapPanel>) {
        self.entries[index] = entry;
    }

    /// Clicking the info button of entry `index` never shows the dialog.
    pub fn fail_dialog(&mut self, index: usize) {
        self.dialog_timeouts.insert(index);
    }

    /// The first close of entry `index` fails and leaves its panel open.
    pub fn fail_close_once(&mut self, index: usize) {
        self.stuck_closes.insert(index);
    }

    pub fn is_panel_open(&self) -> bool {
        self.open.is_some()
    }
}

#[async_trait]
impl CatalogPage for ScriptedPage {
    type Panel = MapPanel;

    async fn wait_until_ready(&mut self) -> PageResult<()> {
        match &self.ready_failure {
            Some(message) => Err(PageError::Navigation {
                url: "scripted://catalog".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn entry_count(&mut self) -> PageResult<usize> {
        Ok(self.entries.len())
    }

    async fn scroll_by(&mut self, dy: i64) -> PageResult<()> {
        self.scrolls.push(dy);
        Ok(())
    }

    async fn open_detail(&mut self, index: usize) -> PageResult<()> {
        if let Some(current) = self.open {
            return Err(PageError::unexpected(format!(
                "panel {} still open when opening {}",
                current, index
            )));
        }
        if self.dialog_timeouts.contains(&index) {
            return Err(PageError::timeout(
                format!("dialog for entry {}", index + 1),
                Duration::from_millis(5000),
            ));
        }
        match self.entries.get(index) {
            Some(Some(_)) => {
                self.open = Some(index);
                self.opened.push(index);
                Ok(())
            }
            _ => Err(PageError::ElementMissing {
                selector: format!("info button {}", index + 1),
            }),
        }
    }

    async fn detail_panel(&mut self) -> PageResult<MapPanel> {
        self.open
            .and_then(|index| self.entries.get(index).cloned().flatten())
            .ok_or_else(|| PageError::unexpected("no panel open"))
    }

    async fn close_detail(&mut self) -> PageResult<()> {
        let Some(index) = self.open else {
            return Err(PageError::unexpected("no panel to close"));
        };
        if self.stuck_closes.remove(&index) {
            return Err(PageError::ElementMissing {
                selector: "close button".to_string(),
            });
        }
        self.open = None;
        self.closes += 1;
        Ok(())
    }

    async fn release(&mut self) -> PageResult<()> {
        self.released = true;
        Ok(())
    }
}

/// SQLite URL for a store file inside `dir`, created on first connect
pub fn sqlite_url(dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("catalog.db").display())
}
