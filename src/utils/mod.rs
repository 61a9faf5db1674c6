//! Utility functions and helpers.

pub mod http;

/// Parse a CSS selector, mapping failures into `AppError::Selector`.
pub fn parse_selector(s: &str) -> crate::error::Result<scraper::Selector> {
    scraper::Selector::parse(s).map_err(|e| crate::error::AppError::selector(s, format!("{e:?}")))
}
