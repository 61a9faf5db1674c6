//! Service layer for the monitor.
//!
//! This module contains the business logic for:
//! - Text normalization and fingerprinting (`fingerprint`)
//! - Feed entry extraction (`feeds`)
//! - Per-source change detection (`SourceChecker`)

mod checker;
pub mod feeds;
pub mod fingerprint;

pub use checker::{Observation, SourceChecker, Verdict};
pub use feeds::FeedEntry;
pub use fingerprint::Section;
