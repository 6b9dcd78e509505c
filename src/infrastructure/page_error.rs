//! Error types for catalog page navigation and detail panel extraction

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Browser session could not be started: {message}")]
    SessionStart { message: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Element not found: {selector}")]
    ElementMissing { selector: String },

    #[error("Required field '{field}' not found in detail panel")]
    FieldMissing {
        field: String,
        tried_selectors: Vec<String>,
    },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unexpected page state: {message}")]
    UnexpectedState { message: String },

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
}

impl PageError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn field_missing(field: &str, tried_selectors: &[String]) -> Self {
        Self::FieldMissing {
            field: field.to_string(),
            tried_selectors: tried_selectors.to_vec(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedState {
            message: message.into(),
        }
    }
}

pub type PageResult<T> = Result<T, PageError>;
