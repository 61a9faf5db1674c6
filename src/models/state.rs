// src/models/state.rs

//! Last-known fingerprints and content snapshots.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SourceKey;

/// Content digest for pages and sections; latest entry id for feeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything one run observed, or everything the previous run left behind.
///
/// Replaced wholesale at the end of each run, so keys for sources that
/// disappeared from the configuration or the page are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    /// Source key to fingerprint
    pub fingerprints: BTreeMap<SourceKey, Fingerprint>,
    /// Page key to last normalized text
    pub snapshots: BTreeMap<SourceKey, String>,
}

impl MonitorState {
    pub fn fingerprint(&self, key: &SourceKey) -> Option<&Fingerprint> {
        self.fingerprints.get(key)
    }

    pub fn snapshot(&self, key: &SourceKey) -> Option<&str> {
        self.snapshots.get(key).map(String::as_str)
    }
}
