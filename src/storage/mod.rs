//! Storage abstractions for monitor persistence.
//!
//! Two kinds of data with different write disciplines:
//! - History: `change_history.json` - append-only ledger of change events,
//!   rewritten in full on every append
//! - State: `hashes.json` + `previous_content.json` - last-known
//!   fingerprints and page text, replaced wholesale once per run
//!
//! ## Directory Structure
//!
//! ```text
//! {root}/
//! ├── sentinel.toml             # Monitor configuration
//! ├── urls.json                 # Source descriptors (read-only)
//! ├── hashes.json               # State: key -> fingerprint
//! ├── previous_content.json     # State: page key -> normalized text
//! ├── change_history.json       # History: ordered change events
//! └── docs/
//!     ├── index.md              # Rendered dashboard
//!     └── logo.png              # Optional, never written
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ChangeEvent, MonitorState};

// Re-export for convenience
pub use local::LocalStorage;

/// Append-only log of change events.
///
/// Callers must serialize access; there is no locking.
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    /// Load every event in append order.
    async fn load_history(&self) -> Result<Vec<ChangeEvent>>;

    /// Load the full log, add one event and persist the full log.
    async fn append_event(&self, event: &ChangeEvent) -> Result<()>;
}

/// Last-known fingerprints and page snapshots per source key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the state left by the previous run; empty if none.
    async fn load_state(&self) -> Result<MonitorState>;

    /// Replace the stored state entirely.
    async fn replace_state(&self, state: &MonitorState) -> Result<()>;
}

/// Everything a monitoring run persists.
#[async_trait]
pub trait MonitorStorage: HistoryLedger + StateStore {
    /// Overwrite the rendered dashboard.
    async fn write_report(&self, document: &str) -> Result<()>;

    /// Whether the optional dashboard logo is present.
    async fn has_logo(&self) -> bool;
}
