//! Markdown dashboard rendering.
//!
//! The dashboard is a pure function of the change history: rendering the
//! same history twice yields byte-identical output.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{ChangeEvent, EventKind, ReportConfig, SourceKey, truncate_preview};

/// Characters removed from anchors after lowercasing and hyphenating.
const ANCHOR_STRIPPED: [char; 6] = ['(', ')', '.', '/', ':', '–'];

/// Rendering options that do not come from the history itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub preview_length: usize,
    pub footer: Option<String>,
    /// Reference `logo.png` at the top of the page
    pub include_logo: bool,
}

impl RenderOptions {
    pub fn from_config(config: &ReportConfig, include_logo: bool) -> Self {
        Self {
            title: config.title.clone(),
            preview_length: config.preview_length,
            footer: config.footer.clone(),
            include_logo,
        }
    }
}

/// Summary table status of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    FirstCheck,
    Changed,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::FirstCheck => "🔄 First Check",
            Status::Changed => "🟢 Changed",
        }
    }
}

/// Running summary of every event recorded for one key.
#[derive(Debug)]
struct KeySummary<'a> {
    source: &'a str,
    label: &'a str,
    first_seen: DateTime<Utc>,
    last_checked: DateTime<Utc>,
    last_change: DateTime<Utc>,
    preview: &'a str,
}

impl KeySummary<'_> {
    fn status(&self) -> Status {
        if self.first_seen == self.last_checked {
            Status::FirstCheck
        } else {
            Status::Changed
        }
    }
}

/// Turn text into an in-page anchor.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| !ANCHOR_STRIPPED.contains(c))
        .collect();
    slug.replace("--", "-")
}

/// Format a timestamp for display.
pub fn human_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Heading of a history section; also the source of its anchor.
fn heading(label: &str, source: &str) -> String {
    if label.is_empty() {
        source.to_string()
    } else {
        format!("{label} – {source}")
    }
}

/// Make text safe for a single markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace(['\n', '|'], " ")
}

/// Fold the history into per-key summaries grouped by site.
///
/// Sites and the keys within each site keep first-appearance order.
fn summarize(
    history: &[ChangeEvent],
) -> (Vec<(&str, Vec<SourceKey>)>, HashMap<SourceKey, KeySummary<'_>>) {
    let mut sites: Vec<(&str, Vec<SourceKey>)> = Vec::new();
    let mut summaries: HashMap<SourceKey, KeySummary<'_>> = HashMap::new();

    for event in history {
        let key = event.key();
        let at = event.timestamp.instant();

        summaries
            .entry(key.clone())
            .and_modify(|summary| {
                summary.label = event.label();
                summary.last_checked = at;
                summary.last_change = at;
                summary.preview = event.preview();
            })
            .or_insert_with(|| KeySummary {
                source: &event.source,
                label: event.label(),
                first_seen: at,
                last_checked: at,
                last_change: at,
                preview: event.preview(),
            });

        let site = event.source.as_str();
        match sites.iter_mut().find(|(s, _)| *s == site) {
            Some((_, keys)) => {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            None => sites.push((site, vec![key])),
        }
    }

    (sites, summaries)
}

/// Render the full dashboard from the change history.
pub fn render(history: &[ChangeEvent], options: &RenderOptions) -> String {
    let (sites, summaries) = summarize(history);
    let mut out = String::new();

    if options.include_logo {
        out.push_str(&format!(
            "<img src=\"logo.png\" alt=\"{} Logo\" width=\"200\"/>\n\n",
            options.title
        ));
    }
    out.push_str(&format!("# {}\n\n", options.title));
    let latest = history
        .last()
        .map(|event| human_date(&event.timestamp.instant()))
        .unwrap_or_else(|| "No updates yet".to_string());
    out.push_str(&format!("**Latest Update:** {latest}\n\n"));
    out.push_str("---\n\n");

    out.push_str("## 🗺️ Legend\n");
    out.push_str("- 🟢 **Changed**: Content changed since last check\n");
    out.push_str("- ✅ **No Change**: No change detected\n");
    out.push_str("- 🔄 **First Check**: First time checking this item\n");
    out.push_str(
        "- _Section/Feed_: For websites, the section or update block; for RSS, the feed entry title\n",
    );
    out.push_str("- _Preview_: Snippet of the changed or monitored content\n");
    out.push_str("\n---\n\n");

    out.push_str("## 📚 Table of Contents\n");
    for (site, keys) in &sites {
        out.push_str(&format!("- [{site}]({site})\n"));
        for key in keys {
            let Some(summary) = summaries.get(key) else {
                continue;
            };
            if !summary.label.is_empty() {
                let anchor = slugify(&heading(summary.label, summary.source));
                out.push_str(&format!("  - [{}](#{anchor})\n", summary.label));
            }
        }
    }
    out.push_str("\n---\n\n");

    out.push_str("## 📊 Monitoring Summary\n\n");
    if summaries.is_empty() {
        out.push_str("No checks performed yet.\n");
    } else {
        out.push_str(
            "| Source | Section/Feed | First Seen | Last Checked | Last Change | Status | Preview |\n",
        );
        out.push_str(
            "|--------|--------------|------------|--------------|-------------|--------|---------|\n",
        );
        for key in sites.iter().flat_map(|(_, keys)| keys) {
            let Some(summary) = summaries.get(key) else {
                continue;
            };
            let preview = table_cell(&truncate_preview(summary.preview, options.preview_length));
            out.push_str(&format!(
                "| [{source}]({source}) | {label} | {first} | {last} | {last_change} | {status} | {preview} |\n",
                source = summary.source,
                label = table_cell(summary.label),
                first = human_date(&summary.first_seen),
                last = human_date(&summary.last_checked),
                last_change = human_date(&summary.last_change),
                status = summary.status().as_str(),
            ));
        }
    }
    out.push_str("\n---\n\n");

    out.push_str("## 📝 Full Change History\n\n");
    if history.is_empty() {
        out.push_str("No changes detected yet.\n");
    } else {
        for event in history.iter().rev() {
            render_event(&mut out, event);
        }
    }

    if let Some(footer) = &options.footer {
        out.push_str("---\n");
        out.push_str(footer);
        out.push('\n');
    }

    out
}

fn render_event(out: &mut String, event: &ChangeEvent) {
    let heading = heading(event.label(), &event.source);
    out.push_str(&format!(
        "### {heading}\n<a name=\"{}\"></a>\n",
        slugify(&heading)
    ));
    out.push_str(&format!("_Checked: {}_  \n", human_date(&event.timestamp.instant())));

    match &event.kind {
        EventKind::Feed {
            title,
            link,
            published,
            summary,
        } => {
            out.push_str("**Type:** RSS Feed  \n");
            out.push_str(&format!("**Title:** {title}  \n"));
            if !link.is_empty() {
                out.push_str(&format!("**Link:** <{link}>  \n"));
            }
            if !published.is_empty() {
                out.push_str(&format!("**Published:** {published}  \n"));
            }
            if !summary.is_empty() {
                out.push_str(&format!("> {}  \n", summary.replace('\n', " ")));
            }
        }
        EventKind::Section { section, preview } => {
            out.push_str("**Type:** Website Section  \n");
            out.push_str(&format!("**Section:** {section}  \n"));
            out.push_str(&format!("> {preview}  \n"));
        }
        EventKind::Page { change } => {
            out.push_str("**Type:** Website  \n");
            out.push_str(&format!("> {change}  \n"));
        }
    }
    out.push_str("\n---\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn options() -> RenderOptions {
        RenderOptions::from_config(&ReportConfig::default(), false)
    }

    fn section(at: &str, source: &str, name: &str, preview: &str) -> ChangeEvent {
        ChangeEvent::new(
            ts(at),
            source,
            EventKind::Section {
                section: name.into(),
                preview: preview.into(),
            },
        )
    }

    fn page(at: &str, source: &str, change: &str) -> ChangeEvent {
        ChangeEvent::new(
            ts(at),
            source,
            EventKind::Page {
                change: change.into(),
            },
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Update 3 (Final)"), "update-3-final");
        assert_eq!(
            slugify("Update 1 – https://x.example/a"),
            "update-1-httpsxexamplea"
        );
        assert_eq!(slugify("v1.2: Notes"), "v12-notes");
    }

    #[test]
    fn test_empty_history() {
        let doc = render(&[], &options());
        assert!(doc.contains("**Latest Update:** No updates yet"));
        assert!(doc.contains("No checks performed yet."));
        assert!(doc.contains("No changes detected yet."));
        assert!(!doc.contains("<img"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let history = vec![
            page("2025-03-01T09:00:00Z", "https://a.example", "First time checking"),
            section("2025-03-01T09:00:00Z", "https://b.example", "News", "Hello"),
            page("2025-03-02T09:00:00Z", "https://a.example", "Content changed"),
        ];
        assert_eq!(render(&history, &options()), render(&history, &options()));
    }

    #[test]
    fn test_history_is_newest_first() {
        let history = vec![
            page("2025-03-01T09:00:00Z", "https://a.example", "First time checking"),
            page("2025-03-02T09:00:00Z", "https://a.example", "Content changed"),
        ];
        let doc = render(&history, &options());
        let newer = doc.find("_Checked: 2025-03-02 09:00 UTC_").unwrap();
        let older = doc.find("_Checked: 2025-03-01 09:00 UTC_").unwrap();
        assert!(newer < older);
        assert!(doc.contains("**Latest Update:** 2025-03-02 09:00 UTC"));
    }

    #[test]
    fn test_summary_status() {
        let history = vec![
            page("2025-03-01T09:00:00Z", "https://a.example", "First time checking"),
            page("2025-03-01T09:00:00Z", "https://b.example", "First time checking"),
            page("2025-03-02T09:00:00Z", "https://a.example", "Content changed"),
        ];
        let doc = render(&history, &options());
        let row_a = doc
            .lines()
            .find(|l| l.starts_with("| [https://a.example]"))
            .unwrap();
        let row_b = doc
            .lines()
            .find(|l| l.starts_with("| [https://b.example]"))
            .unwrap();
        assert!(row_a.contains("| 2025-03-01 09:00 UTC | 2025-03-02 09:00 UTC |"));
        assert!(row_a.contains("🟢 Changed"));
        assert!(row_b.contains("🔄 First Check"));
        assert!(row_b.contains(
            "| 2025-03-01 09:00 UTC | 2025-03-01 09:00 UTC | 2025-03-01 09:00 UTC |"
        ));
        assert!(!doc.contains('—'));
        // One row per key
        assert_eq!(doc.matches("| [https://a.example]").count(), 1);
    }

    #[test]
    fn test_sites_group_keys_in_first_appearance_order() {
        let history = vec![
            section("2025-03-01T09:00:00Z", "https://b.example", "Two", ""),
            page("2025-03-01T09:00:00Z", "https://a.example", "First time checking"),
            section("2025-03-01T09:00:00Z", "https://b.example", "One", ""),
        ];
        let doc = render(&history, &options());
        let b = doc.find("- [https://b.example](https://b.example)").unwrap();
        let a = doc.find("- [https://a.example](https://a.example)").unwrap();
        let two = doc.find("  - [Two]").unwrap();
        let one = doc.find("  - [One]").unwrap();
        assert!(b < two && two < one && one < a);
    }

    #[test]
    fn test_toc_anchor_matches_detail_anchor() {
        let history = vec![section(
            "2025-03-01T09:00:00Z",
            "https://b.example/news",
            "Release (v1.2)",
            "",
        )];
        let doc = render(&history, &options());
        let anchor = slugify("Release (v1.2) – https://b.example/news");
        assert!(doc.contains(&format!("  - [Release (v1.2)](#{anchor})")));
        assert!(doc.contains(&format!("<a name=\"{anchor}\"></a>")));
    }

    #[test]
    fn test_preview_truncated_and_sanitized() {
        let long = format!("a|b\n{}", "x".repeat(200));
        let history = vec![section("2025-03-01T09:00:00Z", "https://b.example", "S", &long)];
        let mut opts = options();
        opts.preview_length = 10;
        let doc = render(&history, &opts);
        assert!(doc.contains("| a b xxxxxx... |"));
    }

    #[test]
    fn test_feed_details() {
        let history = vec![ChangeEvent::new(
            ts("2025-03-01T09:00:00Z"),
            "https://f.example/rss",
            EventKind::Feed {
                title: "Hello".into(),
                link: "https://f.example/1".into(),
                published: "2025-03-01T08:00:00+00:00".into(),
                summary: "line one\nline two".into(),
            },
        )];
        let doc = render(&history, &options());
        assert!(doc.contains("### Hello – https://f.example/rss"));
        assert!(doc.contains("**Type:** RSS Feed  \n"));
        assert!(doc.contains("**Published:** 2025-03-01T08:00:00+00:00  \n"));
        assert!(doc.contains("> line one line two  \n"));
    }

    #[test]
    fn test_logo_and_footer() {
        let mut opts = RenderOptions::from_config(&ReportConfig::default(), true);
        opts.footer = Some("Powered by sentinel".into());
        let doc = render(&[], &opts);
        assert!(doc.starts_with("<img src=\"logo.png\""));
        assert!(doc.ends_with("---\nPowered by sentinel\n"));
    }
}
