//! Detail panel field access
//!
//! [`DetailPanel`] is the capability the extractor reads fields through;
//! [`PanelParser`] implements it for dialog markup captured from the page,
//! so the extraction logic never sees the addressing scheme.

#![allow(clippy::uninlined_format_args)]

use super::config::PanelSelectors;
use crate::infrastructure::page_error::{PageError, PageResult};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// The eight fields exposed by a catalog entry's detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelField {
    Title,
    Rating,
    ReleaseYear,
    Duration,
    Genre,
    Director,
    Stars,
    ShortDescription,
}

impl PanelField {
    pub const ALL: [Self; 8] = [
        Self::Title,
        Self::Rating,
        Self::ReleaseYear,
        Self::Duration,
        Self::Genre,
        Self::Director,
        Self::Stars,
        Self::ShortDescription,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Rating => "rating",
            Self::ReleaseYear => "release_year",
            Self::Duration => "duration",
            Self::Genre => "genre",
            Self::Director => "director",
            Self::Stars => "stars",
            Self::ShortDescription => "short_description",
        }
    }

    fn selectors(self, config: &PanelSelectors) -> &[String] {
        match self {
            Self::Title => &config.title,
            Self::Rating => &config.rating,
            Self::ReleaseYear => &config.release_year,
            Self::Duration => &config.duration,
            Self::Genre => &config.genre,
            Self::Director => &config.director,
            Self::Stars => &config.stars,
            Self::ShortDescription => &config.short_description,
        }
    }
}

impl fmt::Display for PanelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to the fields of an open detail panel
pub trait DetailPanel {
    /// Raw text of `field`, trimmed of surrounding whitespace.
    fn field(&self, field: PanelField) -> PageResult<String>;
}

/// Compiled panel selectors, built once per page session
pub struct PanelParser {
    selectors: HashMap<PanelField, Vec<Selector>>,
    sources: PanelSelectors,
}

impl PanelParser {
    pub fn new(config: &PanelSelectors) -> PageResult<Self> {
        let mut selectors = HashMap::new();
        for field in PanelField::ALL {
            selectors.insert(field, Self::compile_selectors(field.selectors(config))?);
        }

        Ok(Self {
            selectors,
            sources: config.clone(),
        })
    }

    fn compile_selectors(selector_strings: &[String]) -> PageResult<Vec<Selector>> {
        selector_strings
            .iter()
            .map(|raw| {
                Selector::parse(raw).map_err(|e| PageError::InvalidSelector {
                    selector: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Extract every configured field from dialog markup.
    pub fn parse(&self, html: &str) -> HtmlDetailPanel {
        let fragment = Html::parse_fragment(html);
        let mut values = HashMap::new();
        let mut missing = HashMap::new();

        for field in PanelField::ALL {
            let compiled = self.selectors.get(&field).map_or(&[][..], Vec::as_slice);
            match Self::extract_text(&fragment, compiled) {
                Some(text) => {
                    debug!("Extracted {}: {}", field, text);
                    values.insert(field, text);
                }
                None => {
                    warn!("Failed to extract {} using {} selectors", field, compiled.len());
                    missing.insert(field, field.selectors(&self.sources).to_vec());
                }
            }
        }

        HtmlDetailPanel { values, missing }
    }

    /// First non-empty text among the selectors; empty text when only empty
    /// elements matched, `None` when nothing matched.
    fn extract_text(html: &Html, selectors: &[Selector]) -> Option<String> {
        let mut matched_empty = false;
        for selector in selectors {
            if let Some(element) = html.select(selector).next() {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
                matched_empty = true;
            }
        }

        matched_empty.then(String::new)
    }
}

/// Field values captured from one opened dialog
#[derive(Debug, Clone, Default)]
pub struct HtmlDetailPanel {
    values: HashMap<PanelField, String>,
    missing: HashMap<PanelField, Vec<String>>,
}

impl DetailPanel for HtmlDetailPanel {
    fn field(&self, field: PanelField) -> PageResult<String> {
        self.values.get(&field).cloned().ok_or_else(|| {
            let tried = self.missing.get(&field).cloned().unwrap_or_default();
            PageError::field_missing(field.name(), &tried)
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Dialog markup shaped like the live detail prompt
    pub fn dialog_html(title: &str, year: &str, runtime: &str) -> String {
        format!(
            r#"<div role="dialog">
  <div>
    <a class="ipc-title-link-wrapper" href="/title/tt0111161/"><h3 class="ipc-title__text">{title}</h3></a>
    <div data-testid="ratingGroup--imdb-rating"><span class="ipc-rating-star--rating">9.3</span></div>
    <ul class="ipc-inline-list" data-testid="btp_ml"><li>{year}</li><li>{runtime}</li><li>R</li></ul>
    <ul class="ipc-inline-list" data-testid="btp_gl"><li>Drama</li></ul>
  </div>
  <div data-testid="btp_p">
    Over the course of several years, two convicts form a friendship.
  </div>
  <div>
    <div data-testid="p_ct_dr"><span>Director</span><ul><li><a href="/name/nm0001104/">Frank Darabont</a></li></ul></div>
    <div data-testid="p_ct_cst"><span>Stars</span><a>Tim Robbins</a><a>Morgan Freeman</a><a>Bob Gunton</a></div>
  </div>
  <button aria-label="Close Prompt">x</button>
</div>"#
        )
    }
}
