//! Local filesystem storage implementation.
//!
//! All JSON files are written atomically (temp file, then rename) so an
//! interrupted run never leaves a half-written ledger or state map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ChangeEvent, Fingerprint, MonitorState, PathsConfig, SourceKey};
use crate::storage::{HistoryLedger, MonitorStorage, StateStore};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    paths: PathsConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            paths,
        }
    }

    /// Get the full path for a configured relative path.
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root_dir.join(relative)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, relative: &Path, bytes: &[u8]) -> Result<()> {
        let path = self.path(relative);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, relative: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(relative, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, relative: &Path) -> Result<Option<Vec<u8>>> {
        let path = self.path(relative);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, relative: &Path) -> Result<Option<T>> {
        match self.read_bytes(relative).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl HistoryLedger for LocalStorage {
    async fn load_history(&self) -> Result<Vec<ChangeEvent>> {
        Ok(self
            .read_json(&self.paths.history)
            .await?
            .unwrap_or_default())
    }

    async fn append_event(&self, event: &ChangeEvent) -> Result<()> {
        let mut history = self.load_history().await?;
        history.push(event.clone());
        self.write_json(&self.paths.history, &history).await
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load_state(&self) -> Result<MonitorState> {
        let fingerprints: BTreeMap<SourceKey, Fingerprint> = self
            .read_json(&self.paths.fingerprints)
            .await?
            .unwrap_or_default();
        let snapshots: BTreeMap<SourceKey, String> = self
            .read_json(&self.paths.snapshots)
            .await?
            .unwrap_or_default();

        Ok(MonitorState {
            fingerprints,
            snapshots,
        })
    }

    async fn replace_state(&self, state: &MonitorState) -> Result<()> {
        self.write_json(&self.paths.fingerprints, &state.fingerprints)
            .await?;
        self.write_json(&self.paths.snapshots, &state.snapshots)
            .await
    }
}

#[async_trait]
impl MonitorStorage for LocalStorage {
    async fn write_report(&self, document: &str) -> Result<()> {
        self.write_bytes(&self.paths.report, document.as_bytes())
            .await
    }

    async fn has_logo(&self) -> bool {
        tokio::fs::try_exists(self.path(&self.paths.logo))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path(), PathsConfig::default())
    }

    fn event(source: &str) -> ChangeEvent {
        ChangeEvent::new(
            "2025-03-01T09:30:00Z".parse().unwrap(),
            source,
            EventKind::Page {
                change: "First time checking".into(),
            },
        )
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage
            .write_bytes(Path::new("test.txt"), b"hello")
            .await
            .unwrap();
        let data = storage.read_bytes(Path::new("test.txt")).await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let data = storage.read_bytes(Path::new("nope.txt")).await.unwrap();
        assert!(data.is_none());
        assert!(storage.load_history().await.unwrap().is_empty());
        assert_eq!(storage.load_state().await.unwrap(), MonitorState::default());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.append_event(&event("https://a.example")).await.unwrap();
        storage.append_event(&event("https://b.example")).await.unwrap();
        storage.append_event(&event("https://c.example")).await.unwrap();

        let history = storage.load_history().await.unwrap();
        let sources: Vec<_> = history.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[tokio::test]
    async fn test_replace_state_drops_old_keys() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let mut first = MonitorState::default();
        first
            .fingerprints
            .insert(SourceKey::url("https://old.example"), Fingerprint::new("1"));
        first
            .snapshots
            .insert(SourceKey::url("https://old.example"), "text".into());
        storage.replace_state(&first).await.unwrap();

        let mut second = MonitorState::default();
        second
            .fingerprints
            .insert(SourceKey::url("https://new.example"), Fingerprint::new("2"));
        storage.replace_state(&second).await.unwrap();

        let loaded = storage.load_state().await.unwrap();
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn test_state_file_is_plain_map() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let mut state = MonitorState::default();
        state.fingerprints.insert(
            SourceKey::section("https://x.example", "News"),
            Fingerprint::new("abc"),
        );
        storage.replace_state(&state).await.unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("hashes.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["https://x.example::News"], "abc");
    }

    #[tokio::test]
    async fn test_report_and_logo() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        assert!(!storage.has_logo().await);
        storage.write_report("# Dashboard\n").await.unwrap();
        let written = std::fs::read_to_string(tmp.path().join("docs/index.md")).unwrap();
        assert_eq!(written, "# Dashboard\n");

        std::fs::write(tmp.path().join("docs/logo.png"), b"png").unwrap();
        assert!(storage.has_logo().await);
    }
}
