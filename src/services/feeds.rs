// src/services/feeds.rs

//! Feed fetching and latest-entry extraction.

use feed_rs::parser;

use crate::error::{AppError, Result};
use crate::utils::http::PageFetcher;

/// Fields of the newest entry of a feed; missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
}

/// Parse feed bytes and return the newest (first) entry, if any.
///
/// An entry without its own id gets an empty one; generated ids would
/// differ between parses of the same feed.
pub fn latest_entry(url: &str, bytes: &[u8]) -> Result<Option<FeedEntry>> {
    let feed = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build()
        .parse(bytes)
        .map_err(|e| AppError::feed(url, e))?;

    Ok(feed.entries.into_iter().next().map(|entry| FeedEntry {
        id: entry.id,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        published: entry
            .published
            .map(|p| p.to_rfc3339())
            .unwrap_or_default(),
        summary: entry.summary.map(|s| s.content).unwrap_or_default(),
    }))
}

/// Fetch a feed and return its newest entry.
pub async fn fetch_latest(fetcher: &dyn PageFetcher, url: &str) -> Result<Option<FeedEntry>> {
    let body = fetcher.fetch_bytes(url).await?;
    latest_entry(url, &body)
}
