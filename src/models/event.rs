// src/models/event.rs

//! Change history entries.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SourceKey;

/// Change description recorded for a page seen for the first time.
pub const FIRST_CHECK: &str = "First time checking";

/// Change description recorded for a page whose fingerprint moved.
pub const CONTENT_CHANGED: &str = "Content changed";

/// Instant of a change event together with the text it is stored as.
///
/// Entries read from disk keep their original text, so rewriting the
/// ledger on append leaves earlier entries byte-for-byte intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            text: instant.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        }
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let instant = DateTime::parse_from_rfc3339(&text)?.with_timezone(&Utc);
        Ok(Self { instant, text })
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.text
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One immutable, timestamped record of a detected change or first observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Run instant, shared by every event of one run
    pub timestamp: Timestamp,

    /// Original source URL
    pub source: String,

    /// Type tag and type-specific payload
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Type-specific payload of a change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    /// Whole page or selector region.
    #[serde(rename = "html")]
    Page { change: String },

    /// One heading-keyed section of a page.
    #[serde(rename = "html-section")]
    Section {
        section: String,
        #[serde(default)]
        preview: String,
    },

    /// Newest feed entry.
    #[serde(rename = "rss")]
    Feed {
        #[serde(default)]
        title: String,
        #[serde(default)]
        link: String,
        #[serde(default)]
        published: String,
        #[serde(default)]
        summary: String,
    },
}

impl ChangeEvent {
    pub fn new(timestamp: DateTime<Utc>, source: impl Into<String>, kind: EventKind) -> Self {
        Self {
            timestamp: timestamp.into(),
            source: source.into(),
            kind,
        }
    }

    /// Key this event is summarized under.
    pub fn key(&self) -> SourceKey {
        match &self.kind {
            EventKind::Section { section, .. } => SourceKey::section(&self.source, section),
            EventKind::Page { .. } | EventKind::Feed { .. } => SourceKey::url(&self.source),
        }
    }

    /// Section heading or feed entry title; empty for pages.
    pub fn label(&self) -> &str {
        match &self.kind {
            EventKind::Section { section, .. } => section,
            EventKind::Feed { title, .. } => title,
            EventKind::Page { .. } => "",
        }
    }

    /// Extracted text preview or feed summary; empty for pages.
    pub fn preview(&self) -> &str {
        match &self.kind {
            EventKind::Section { preview, .. } => preview,
            EventKind::Feed { summary, .. } => summary,
            EventKind::Page { .. } => "",
        }
    }

    /// Serialized type tag.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EventKind::Page { .. } => "html",
            EventKind::Section { .. } => "html-section",
            EventKind::Feed { .. } => "rss",
        }
    }
}

/// Cut `text` to at most `limit` characters, appending `...` when cut.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        "2025-03-01T09:30:00Z".parse().unwrap()
    }

    #[test]
    fn test_serialized_shape_is_flat() {
        let event = ChangeEvent::new(
            ts(),
            "https://x.example",
            EventKind::Section {
                section: "Update 1".into(),
                preview: "Body".into(),
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "html-section");
        assert_eq!(value["source"], "https://x.example");
        assert_eq!(value["section"], "Update 1");
        assert_eq!(value["preview"], "Body");
    }

    #[test]
    fn test_reads_python_style_timestamps() {
        let json = r#"{"timestamp": "2025-03-01T09:30:00.123456+00:00",
                       "type": "rss", "source": "https://x.example/feed",
                       "title": "Hello"}"#;
        let event: ChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.label(), "Hello");
        assert_eq!(event.type_name(), "rss");
        assert_eq!(event.key().as_str(), "https://x.example/feed");
    }

    #[test]
    fn test_loaded_timestamp_text_survives_rewrite() {
        let json = r#"{"timestamp":"2025-03-01T09:30:00.123456+00:00","type":"html","source":"https://x.example","change":"Content changed"}"#;
        let event: ChangeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event.timestamp.instant(),
            "2025-03-01T09:30:00.123456Z".parse::<DateTime<Utc>>().unwrap()
        );

        let written = serde_json::to_string(&event).unwrap();
        assert!(written.contains(r#""timestamp":"2025-03-01T09:30:00.123456+00:00""#));
    }

    #[test]
    fn test_new_timestamps_use_offset_notation() {
        let event = ChangeEvent::new(
            ts(),
            "https://x.example",
            EventKind::Page {
                change: FIRST_CHECK.into(),
            },
        );
        assert_eq!(event.timestamp.as_str(), "2025-03-01T09:30:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let json = r#"{"timestamp":"yesterday","type":"html","source":"s","change":"c"}"#;
        assert!(serde_json::from_str::<ChangeEvent>(json).is_err());
    }

    #[test]
    fn test_section_key_is_composite() {
        let event = ChangeEvent::new(
            ts(),
            "https://x.example",
            EventKind::Section {
                section: "A".into(),
                preview: String::new(),
            },
        );
        assert_eq!(event.key(), SourceKey::section("https://x.example", "A"));
    }

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("abcdef", 3), "abc...");
        assert_eq!(truncate_preview("abc", 3), "abc");
        assert_eq!(truncate_preview("한국어텍스트", 2), "한국...");
    }
}
