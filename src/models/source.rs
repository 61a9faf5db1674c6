// src/models/source.rs

//! Watched source descriptors and the keys their state is tracked under.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use url::Url;

use crate::error::{AppError, Result};
use crate::utils::parse_selector;

/// One configured thing being watched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Whole page text.
    Page { url: String },

    /// Text of the first element matching `selector`, noise removed.
    Selector { url: String, selector: String },

    /// One page split into sections keyed by heading text.
    Sectioned {
        url: String,
        selector: String,
        section_selector: String,
        heading_selector: String,
    },

    /// Latest entry of a syndication feed.
    Feed { url: String },
}

impl Source {
    /// Load source descriptors from a JSON file.
    ///
    /// A missing file yields an empty list.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Self::parse_all(&content)
    }

    /// Parse a JSON array of source descriptors.
    pub fn parse_all(json: &str) -> Result<Vec<Self>> {
        let raw: Vec<RawSource> = serde_json::from_str(json)?;
        Ok(raw.into_iter().map(Self::from).collect())
    }

    /// The URL fetched for this source.
    pub fn url(&self) -> &str {
        match self {
            Source::Page { url }
            | Source::Selector { url, .. }
            | Source::Sectioned { url, .. }
            | Source::Feed { url } => url,
        }
    }

    /// Short name of the descriptor kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Page { .. } => "page",
            Source::Selector { .. } => "page+selector",
            Source::Sectioned { .. } => "sectioned-page",
            Source::Feed { .. } => "feed",
        }
    }

    /// All CSS selectors this descriptor uses.
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Source::Page { .. } | Source::Feed { .. } => Vec::new(),
            Source::Selector { selector, .. } => vec![selector.as_str()],
            Source::Sectioned {
                selector,
                section_selector,
                heading_selector,
                ..
            } => vec![
                selector.as_str(),
                section_selector.as_str(),
                heading_selector.as_str(),
            ],
        }
    }

    /// Check that the URL is absolute and every selector parses.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.url())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                self.url()
            )));
        }
        for selector in self.selectors() {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// Descriptor shapes accepted in the sources file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSource {
    Bare(String),
    Feed {
        #[serde(alias = "feedUrl", alias = "feed_url")]
        rss: String,
    },
    Entry {
        url: String,
        #[serde(default)]
        selector: Option<String>,
        #[serde(default)]
        section_selector: Option<String>,
        #[serde(default)]
        heading_selector: Option<String>,
    },
}

impl From<RawSource> for Source {
    fn from(raw: RawSource) -> Self {
        match raw {
            RawSource::Bare(url) => Source::Page { url },
            RawSource::Feed { rss } => Source::Feed { url: rss },
            RawSource::Entry {
                url,
                selector,
                section_selector,
                heading_selector,
            } => match (selector, section_selector, heading_selector) {
                (Some(selector), Some(section_selector), Some(heading_selector)) => {
                    Source::Sectioned {
                        url,
                        selector,
                        section_selector,
                        heading_selector,
                    }
                }
                (Some(selector), _, _) => Source::Selector { url, selector },
                (None, _, _) => Source::Page { url },
            },
        }
    }
}

/// Identity under which fingerprints and snapshots are tracked.
///
/// Pages and feeds use their URL; sections use `url::heading`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    /// Key for a page or feed.
    pub fn url(url: &str) -> Self {
        Self(url.to_string())
    }

    /// Composite key for one section of a page.
    pub fn section(url: &str, heading: &str) -> Self {
        Self(format!("{url}::{heading}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
