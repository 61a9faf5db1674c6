// src/pipeline/run.rs

//! One monitoring run: check every source, record changes, refresh state,
//! regenerate the dashboard.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ChangeEvent, Config, MonitorState, ReportConfig, RunSummary, Source};
use crate::pipeline::diff::unified_diff;
use crate::pipeline::report::{RenderOptions, render};
use crate::services::{Observation, SourceChecker, Verdict};
use crate::storage::MonitorStorage;
use crate::utils::http::PageFetcher;

/// Context lines around each change in the operator diff.
const DIFF_CONTEXT: usize = 3;

/// Drives a monitoring run over explicit configuration, storage and fetcher.
pub struct Monitor<'a> {
    config: &'a Config,
    storage: &'a dyn MonitorStorage,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> Monitor<'a> {
    pub fn new(
        config: &'a Config,
        storage: &'a dyn MonitorStorage,
        fetcher: &'a dyn PageFetcher,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
        }
    }

    /// Run over `sources`, stamping every event with the current time.
    pub async fn run(&self, sources: &[Source]) -> Result<RunSummary> {
        self.run_at(sources, Utc::now()).await
    }

    /// Run over `sources`, stamping every event with `now`.
    ///
    /// Sources are checked strictly one after another. A source that fails
    /// to fetch or parse is logged and skipped; it contributes nothing to
    /// the new state. History appends happen as changes are found; state
    /// is replaced once all sources are done.
    pub async fn run_at(&self, sources: &[Source], now: DateTime<Utc>) -> Result<RunSummary> {
        let prior = self.storage.load_state().await?;
        let checker =
            SourceChecker::new(self.fetcher, self.config.report.section_preview_length);

        let mut next = MonitorState::default();
        let mut summary = RunSummary {
            sources: sources.len(),
            ..RunSummary::default()
        };

        for source in sources {
            log::info!("Checking {} ({}) ...", source.url(), source.kind());

            let observations = match checker.check(source, &prior).await {
                Ok(observations) => observations,
                Err(e) => {
                    summary.failed += 1;
                    log::warn!("Error checking {}: {}", source.url(), e);
                    continue;
                }
            };

            for observation in observations {
                self.record(source, observation, &prior, &mut next, &mut summary, now)
                    .await?;
            }
        }

        self.storage.replace_state(&next).await?;
        self.regenerate_report().await?;

        log::info!(
            "Run complete: {} sources, {} first seen, {} changed, {} unchanged, {} failed, {} events",
            summary.sources,
            summary.first_seen,
            summary.changed,
            summary.unchanged,
            summary.failed,
            summary.events
        );

        Ok(summary)
    }

    async fn record(
        &self,
        source: &Source,
        observation: Observation,
        prior: &MonitorState,
        next: &mut MonitorState,
        summary: &mut RunSummary,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let key = &observation.key;

        match observation.verdict {
            Verdict::FirstSeen => {
                summary.first_seen += 1;
                log::info!("First time checking: {key}");
            }
            Verdict::Unchanged => {
                summary.unchanged += 1;
                log::info!("No change: {key}");
            }
            Verdict::Changed => {
                summary.changed += 1;
                log::info!("CHANGE DETECTED: {key}");
                if let Some(current) = &observation.snapshot {
                    show_diff(prior.snapshot(key).unwrap_or_default(), current, key);
                }
            }
            Verdict::Retained => log::debug!("Keeping previous identity for {key}"),
        }

        if let Some(kind) = observation.event {
            let event = ChangeEvent::new(now, source.url(), kind);
            self.storage.append_event(&event).await?;
            summary.events += 1;
        }

        if let Some(snapshot) = observation.snapshot {
            next.snapshots.insert(observation.key.clone(), snapshot);
        }
        next.fingerprints
            .insert(observation.key, observation.fingerprint);
        Ok(())
    }

    /// Rebuild the dashboard from the full history.
    pub async fn regenerate_report(&self) -> Result<usize> {
        regenerate_report(&self.config.report, self.storage).await
    }
}

/// Rebuild the dashboard from the full history.
///
/// Returns the number of history entries rendered.
pub async fn regenerate_report(
    report: &ReportConfig,
    storage: &dyn MonitorStorage,
) -> Result<usize> {
    let history = storage.load_history().await?;
    let options = RenderOptions::from_config(report, storage.has_logo().await);
    storage.write_report(&render(&history, &options)).await?;
    Ok(history.len())
}

/// Log the line diff between the previous and current page text.
fn show_diff(previous: &str, current: &str, key: impl std::fmt::Display) {
    let diff = unified_diff(previous, current, DIFF_CONTEXT);
    let separator = "=".repeat(80);
    if diff.trim().is_empty() {
        log::info!(
            "Content of {key} changed but diff is not easily readable (possibly formatting changes)"
        );
    } else {
        log::info!("Changes for {key}:\n{separator}\n{diff}\n{separator}");
    }
}
