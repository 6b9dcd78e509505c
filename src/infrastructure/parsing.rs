//! Detail panel parsing for the catalog page
//!
//! Selector configuration with ordered fallbacks plus the parser that turns
//! captured dialog markup into field values.

pub mod config;
pub mod detail_panel;

pub use config::{PageLayout, PanelSelectors, POSITION_PLACEHOLDER};
pub use detail_panel::{DetailPanel, HtmlDetailPanel, PanelField, PanelParser};
