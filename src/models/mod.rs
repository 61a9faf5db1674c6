// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod event;
mod source;
mod state;

// Re-export all public types
pub use config::{Config, FetchConfig, PathsConfig, ReportConfig};
pub use event::{
    CONTENT_CHANGED, ChangeEvent, EventKind, FIRST_CHECK, Timestamp, truncate_preview,
};
pub use source::{Source, SourceKey};
pub use state::{Fingerprint, MonitorState};

/// Counters for one monitoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Configured sources processed
    pub sources: usize,
    /// Keys observed for the first time
    pub first_seen: usize,
    /// Keys whose fingerprint moved
    pub changed: usize,
    /// Keys whose fingerprint stayed the same
    pub unchanged: usize,
    /// Sources that produced no fingerprint
    pub failed: usize,
    /// Events appended to the history
    pub events: usize,
}
