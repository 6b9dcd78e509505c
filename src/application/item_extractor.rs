//! Per-entry detail panel lifecycle
//!
//! Scroll, open the entry's panel, read and normalize its eight fields,
//! close it. Any failure skips the entry; the run continues with the next.

#![allow(clippy::uninlined_format_args)]

use crate::domain::MovieDetails;
use crate::domain::normalizer::{normalize_cast_list, normalize_duration, strip_label};
use crate::infrastructure::catalog_page::CatalogPage;
use crate::infrastructure::config::{ScraperConfig, ScrollRange};
use crate::infrastructure::page_error::{PageError, PageResult};
use crate::infrastructure::parsing::{DetailPanel, PanelField};
use std::time::Duration;
use tracing::{debug, warn};

/// Result of processing one catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Extracted(MovieDetails),
    Skipped { index: usize, reason: String },
}

/// Read the eight panel fields and apply the field normalizers.
pub fn read_details(panel: &impl DetailPanel, cast_label: &str) -> PageResult<MovieDetails> {
    let text = |field: PanelField| panel.field(field).map(|value| value.trim().to_string());

    Ok(MovieDetails {
        title: text(PanelField::Title)?,
        rating: text(PanelField::Rating)?,
        release_year: text(PanelField::ReleaseYear)?,
        duration: normalize_duration(&text(PanelField::Duration)?),
        genre: text(PanelField::Genre)?,
        director: text(PanelField::Director)?,
        stars: strip_label(&normalize_cast_list(&text(PanelField::Stars)?), cast_label),
        short_description: text(PanelField::ShortDescription)?,
    })
}

pub struct ItemExtractor {
    rng: fastrand::Rng,
    first_scroll: ScrollRange,
    second_scroll: ScrollRange,
    settle_delay: Duration,
    cast_label: String,
}

impl ItemExtractor {
    pub fn new(config: &ScraperConfig) -> Self {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Extractor with a seeded scroll generator, for reproducible runs.
    pub fn with_seed(config: &ScraperConfig, seed: u64) -> Self {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: &ScraperConfig, rng: fastrand::Rng) -> Self {
        Self {
            rng,
            first_scroll: config.first_scroll,
            second_scroll: config.second_scroll,
            settle_delay: config.settle_delay(),
            cast_label: config.cast_label.clone(),
        }
    }

    fn scroll_step(&mut self, range: ScrollRange) -> i64 {
        if range.is_empty() {
            return range.min;
        }
        self.rng.i64(range.min..range.max)
    }

    /// Process entry `index` (0-based). Never fails; failures become skips.
    pub async fn extract<P: CatalogPage>(&mut self, page: &mut P, index: usize) -> ItemOutcome {
        let mut panel_open = false;
        match self.try_extract(page, index, &mut panel_open).await {
            Ok(details) => {
                debug!("Entry {}: extracted '{}'", index, details.title);
                if !self.settle_delay.is_zero() {
                    tokio::time::sleep(self.settle_delay).await;
                }
                ItemOutcome::Extracted(details)
            }
            Err(e) => {
                warn!("Entry {}: skipped: {}", index, e);
                if panel_open {
                    if let Err(close_err) = page.close_detail().await {
                        debug!("Entry {}: could not close panel after failure: {}", index, close_err);
                    }
                }
                ItemOutcome::Skipped {
                    index,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_extract<P: CatalogPage>(
        &mut self,
        page: &mut P,
        index: usize,
        panel_open: &mut bool,
    ) -> Result<MovieDetails, PageError> {
        let first = self.scroll_step(self.first_scroll);
        page.scroll_by(first).await?;
        let second = self.scroll_step(self.second_scroll);
        page.scroll_by(second).await?;

        page.open_detail(index).await?;
        *panel_open = true;

        let panel = page.detail_panel().await?;
        let details = read_details(&panel, &self.cast_label)?;

        page.close_detail().await?;
        *panel_open = false;

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MapPanel;

    #[test]
    fn test_read_details_normalizes_fields() {
        let panel = MapPanel::complete("Fight Club", "1999")
            .with(PanelField::Duration, "2h 19min")
            .with(PanelField::Stars, "StarsBrad PittEdward NortonMeat Loaf");

        let details = read_details(&panel, "Stars").unwrap();
        assert_eq!(details.title, "Fight Club");
        assert_eq!(details.duration, "2:19");
        assert_eq!(details.stars, "Brad Pitt, Edward Norton, Meat Loaf");
    }

    #[test]
    fn test_read_details_fails_on_missing_field() {
        let panel = MapPanel::complete("Fight Club", "1999").without(PanelField::Genre);
        assert!(matches!(
            read_details(&panel, "Stars"),
            Err(PageError::FieldMissing { .. })
        ));
    }

    #[test]
    fn test_scroll_steps_stay_in_range() {
        let config = ScraperConfig::default();
        let mut extractor = ItemExtractor::with_seed(&config, 7);
        for _ in 0..200 {
            let first = extractor.scroll_step(config.first_scroll);
            let second = extractor.scroll_step(config.second_scroll);
            assert!((0..70).contains(&first));
            assert!((50..100).contains(&second));
        }
    }
}
