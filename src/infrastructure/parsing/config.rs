//! Page layout configuration for the catalog page and its detail panel
//!
//! Centralized configuration for the selectors used to address entries,
//! the "more info" control, the dialog and its fields.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the 1-based entry position in the info button XPath.
pub const POSITION_PLACEHOLDER: &str = "{position}";

/// How the catalog page and its detail dialog are addressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayout {
    /// CSS selector matching every catalog entry container
    pub entry_selector: String,

    /// XPath template for an entry's "more info" button
    pub info_button_xpath: String,

    /// CSS selector for the visible detail dialog
    pub dialog_selector: String,

    /// CSS selector for the dialog's close control
    pub close_button_selector: String,

    /// Field selectors resolved against the dialog markup
    pub panel: PanelSelectors,
}

impl PageLayout {
    /// XPath of the info button for the entry at `index` (0-based).
    pub fn info_button_xpath_for(&self, index: usize) -> String {
        self.info_button_xpath
            .replace(POSITION_PLACEHOLDER, &(index + 1).to_string())
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        use crate::infrastructure::config::imdb;
        Self {
            entry_selector: imdb::ENTRY_SELECTOR.to_string(),
            info_button_xpath: imdb::INFO_BUTTON_XPATH.to_string(),
            dialog_selector: imdb::DIALOG_SELECTOR.to_string(),
            close_button_selector: imdb::CLOSE_BUTTON_SELECTOR.to_string(),
            panel: PanelSelectors::default(),
        }
    }
}

/// CSS selectors for detail panel fields, each with ordered fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSelectors {
    pub title: Vec<String>,
    pub rating: Vec<String>,
    pub release_year: Vec<String>,
    pub duration: Vec<String>,
    pub genre: Vec<String>,
    pub director: Vec<String>,
    pub stars: Vec<String>,
    pub short_description: Vec<String>,
}

impl PanelSelectors {
    /// Field name and selector list pairs, in panel reading order
    pub fn entries(&self) -> [(&'static str, &[String]); 8] {
        [
            ("title", self.title.as_slice()),
            ("rating", self.rating.as_slice()),
            ("release_year", self.release_year.as_slice()),
            ("duration", self.duration.as_slice()),
            ("genre", self.genre.as_slice()),
            ("director", self.director.as_slice()),
            ("stars", self.stars.as_slice()),
            ("short_description", self.short_description.as_slice()),
        ]
    }
}

fn selectors(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for PanelSelectors {
    fn default() -> Self {
        Self {
            title: selectors(&["a.ipc-title-link-wrapper h3", "h3.ipc-title__text", "h3"]),
            rating: selectors(&[
                "span.ipc-rating-star--rating",
                "[data-testid='ratingGroup--imdb-rating'] span",
            ]),
            release_year: selectors(&[
                "[data-testid='btp_ml'] li:nth-child(1)",
                "ul.ipc-inline-list:first-of-type > li:nth-child(1)",
            ]),
            duration: selectors(&[
                "[data-testid='btp_ml'] li:nth-child(2)",
                "ul.ipc-inline-list:first-of-type > li:nth-child(2)",
            ]),
            genre: selectors(&[
                "[data-testid='btp_gl'] li",
                "ul.ipc-inline-list:nth-of-type(2) > li",
            ]),
            director: selectors(&["[data-testid='p_ct_dr'] a", "[data-testid='p_ct_dr'] li"]),
            stars: selectors(&["[data-testid='p_ct_cst']"]),
            short_description: selectors(&["[data-testid='btp_p']", ".ipc-html-content-inner-div"]),
        }
    }
}
