//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Locations of persisted files, relative to the storage root
    #[serde(default)]
    pub paths: PathsConfig,

    /// Dashboard rendering settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.report.preview_length == 0 {
            return Err(AppError::validation("report.preview_length must be > 0"));
        }
        if self.report.section_preview_length == 0 {
            return Err(AppError::validation(
                "report.section_preview_length must be > 0",
            ));
        }
        for (name, path) in self.paths.entries() {
            if path.as_os_str().is_empty() {
                return Err(AppError::validation(format!("paths.{name} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            paths: PathsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Persisted file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Source descriptor list (read-only)
    #[serde(default = "defaults::sources")]
    pub sources: PathBuf,

    /// Source key to fingerprint map
    #[serde(default = "defaults::fingerprints")]
    pub fingerprints: PathBuf,

    /// Source key to last normalized text map
    #[serde(default = "defaults::snapshots")]
    pub snapshots: PathBuf,

    /// Append-only change history
    #[serde(default = "defaults::history")]
    pub history: PathBuf,

    /// Rendered dashboard
    #[serde(default = "defaults::report")]
    pub report: PathBuf,

    /// Optional logo shown at the top of the dashboard
    #[serde(default = "defaults::logo")]
    pub logo: PathBuf,
}

impl PathsConfig {
    fn entries(&self) -> [(&'static str, &Path); 6] {
        [
            ("sources", &self.sources),
            ("fingerprints", &self.fingerprints),
            ("snapshots", &self.snapshots),
            ("history", &self.history),
            ("report", &self.report),
            ("logo", &self.logo),
        ]
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: defaults::sources(),
            fingerprints: defaults::fingerprints(),
            snapshots: defaults::snapshots(),
            history: defaults::history(),
            report: defaults::report(),
            logo: defaults::logo(),
        }
    }
}

/// Dashboard rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dashboard heading
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Character budget of the summary table preview column
    #[serde(default = "defaults::preview_length")]
    pub preview_length: usize,

    /// Character budget of a section event's stored preview
    #[serde(default = "defaults::section_preview_length")]
    pub section_preview_length: usize,

    /// Markdown line written at the bottom of the dashboard
    #[serde(default)]
    pub footer: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: defaults::title(),
            preview_length: defaults::preview_length(),
            section_preview_length: defaults::section_preview_length(),
            footer: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Path defaults
    pub fn sources() -> PathBuf {
        "urls.json".into()
    }
    pub fn fingerprints() -> PathBuf {
        "hashes.json".into()
    }
    pub fn snapshots() -> PathBuf {
        "previous_content.json".into()
    }
    pub fn history() -> PathBuf {
        "change_history.json".into()
    }
    pub fn report() -> PathBuf {
        PathBuf::from("docs").join("index.md")
    }
    pub fn logo() -> PathBuf {
        PathBuf::from("docs").join("logo.png")
    }

    // Report defaults
    pub fn title() -> String {
        "Change Monitoring Dashboard".into()
    }
    pub fn preview_length() -> usize {
        100
    }
    pub fn section_preview_length() -> usize {
        500
    }
}
