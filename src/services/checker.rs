// src/services/checker.rs

//! Per-source change detection.
//!
//! Fetches one configured source, fingerprints it and compares every
//! resulting key against the previous run's state.

use crate::error::Result;
use crate::models::{
    CONTENT_CHANGED, EventKind, FIRST_CHECK, Fingerprint, MonitorState, Source, SourceKey,
    truncate_preview,
};
use crate::services::feeds;
use crate::services::fingerprint::{extract_sections, fingerprint, page_text};
use crate::utils::http::PageFetcher;
use crate::utils::parse_selector;

/// Outcome of comparing one key against its previous fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Key absent from the previous state
    FirstSeen,
    /// Same fingerprint as last run
    Unchanged,
    /// Fingerprint differs from last run
    Changed,
    /// Nothing observed this run; the previous fingerprint is kept
    Retained,
}

impl Verdict {
    /// Compare a key's previous fingerprint with the current one.
    pub fn compare(previous: Option<&Fingerprint>, current: &Fingerprint) -> Self {
        match previous {
            None => Verdict::FirstSeen,
            Some(previous) if previous == current => Verdict::Unchanged,
            Some(_) => Verdict::Changed,
        }
    }

    /// Whether this verdict is recorded in the change history.
    pub fn is_recorded(self) -> bool {
        matches!(self, Verdict::FirstSeen | Verdict::Changed)
    }
}

/// What one run learned about one source key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub key: SourceKey,
    pub fingerprint: Fingerprint,
    /// Normalized page text; only whole-page and selector sources keep one
    pub snapshot: Option<String>,
    pub verdict: Verdict,
    /// History payload, present when the verdict is recorded
    pub event: Option<EventKind>,
}

/// Checks configured sources against the previous run's state.
pub struct SourceChecker<'a> {
    fetcher: &'a dyn PageFetcher,
    section_preview_length: usize,
}

impl<'a> SourceChecker<'a> {
    /// Create a checker that fetches through `fetcher`.
    pub fn new(fetcher: &'a dyn PageFetcher, section_preview_length: usize) -> Self {
        Self {
            fetcher,
            section_preview_length,
        }
    }

    /// Check one source.
    ///
    /// Sectioned pages yield one observation per discovered heading. An
    /// error means no fingerprint was produced for this source this run.
    pub async fn check(&self, source: &Source, prior: &MonitorState) -> Result<Vec<Observation>> {
        match source {
            Source::Page { url } => self.check_page(url, None, prior).await,
            Source::Selector { url, selector } => {
                self.check_page(url, Some(selector), prior).await
            }
            Source::Sectioned {
                url,
                selector,
                section_selector,
                heading_selector,
            } => {
                self.check_sections(url, selector, section_selector, heading_selector, prior)
                    .await
            }
            Source::Feed { url } => Ok(self.check_feed(url, prior).await),
        }
    }

    async fn check_page(
        &self,
        url: &str,
        selector: Option<&str>,
        prior: &MonitorState,
    ) -> Result<Vec<Observation>> {
        let selector = selector.map(parse_selector).transpose()?;
        let html = self.fetcher.fetch_text(url).await?;
        Ok(vec![Self::observe_page(url, &html, selector.as_ref(), prior)?])
    }

    fn observe_page(
        url: &str,
        html: &str,
        selector: Option<&scraper::Selector>,
        prior: &MonitorState,
    ) -> Result<Observation> {
        let text = page_text(html, selector)?;
        let key = SourceKey::url(url);
        let current = fingerprint(&text);
        let verdict = Verdict::compare(prior.fingerprint(&key), &current);

        let event = match verdict {
            Verdict::FirstSeen => Some(FIRST_CHECK),
            Verdict::Changed => Some(CONTENT_CHANGED),
            Verdict::Unchanged | Verdict::Retained => None,
        }
        .map(|change| EventKind::Page {
            change: change.to_string(),
        });

        Ok(Observation {
            key,
            fingerprint: current,
            snapshot: Some(text),
            verdict,
            event,
        })
    }

    async fn check_sections(
        &self,
        url: &str,
        container: &str,
        section: &str,
        heading: &str,
        prior: &MonitorState,
    ) -> Result<Vec<Observation>> {
        let container = parse_selector(container)?;
        let section = parse_selector(section)?;
        let heading = parse_selector(heading)?;
        let html = self.fetcher.fetch_text(url).await?;

        let Some(sections) = extract_sections(&html, &container, &section, &heading) else {
            log::warn!("Section container not found on {url}; tracking the whole page");
            return Ok(vec![Self::observe_page(url, &html, Some(&container), prior)?]);
        };

        let observations = sections
            .into_iter()
            .map(|found| {
                let key = SourceKey::section(url, &found.heading);
                let current = fingerprint(&found.text);
                let verdict = Verdict::compare(prior.fingerprint(&key), &current);
                let event = verdict.is_recorded().then(|| EventKind::Section {
                    preview: truncate_preview(&found.text, self.section_preview_length),
                    section: found.heading,
                });

                Observation {
                    key,
                    fingerprint: current,
                    snapshot: None,
                    verdict,
                    event,
                }
            })
            .collect();

        Ok(observations)
    }

    /// Feeds never fail the run: an unreachable, unparseable or empty feed
    /// keeps its previous identity and records nothing.
    async fn check_feed(&self, url: &str, prior: &MonitorState) -> Vec<Observation> {
        let key = SourceKey::url(url);

        let entry = match feeds::fetch_latest(self.fetcher, url).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                log::info!("Feed has no entries: {url}");
                return Self::retain(key, prior);
            }
            Err(e) => {
                log::warn!("Error reading feed {url}: {e}");
                return Self::retain(key, prior);
            }
        };

        let current = Fingerprint::new(entry.id.clone());
        let verdict = Verdict::compare(prior.fingerprint(&key), &current);
        let noteworthy = !entry.title.is_empty() || !entry.id.is_empty();
        let event = (verdict.is_recorded() && noteworthy).then(|| EventKind::Feed {
            title: entry.title,
            link: entry.link,
            published: entry.published,
            summary: entry.summary,
        });

        vec![Observation {
            key,
            fingerprint: current,
            snapshot: None,
            verdict,
            event,
        }]
    }

    fn retain(key: SourceKey, prior: &MonitorState) -> Vec<Observation> {
        prior
            .fingerprint(&key)
            .cloned()
            .map(|previous| Observation {
                key,
                fingerprint: previous,
                snapshot: None,
                verdict: Verdict::Retained,
                event: None,
            })
            .into_iter()
            .collect()
    }
}
