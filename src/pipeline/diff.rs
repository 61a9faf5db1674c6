//! Line-oriented unified diff between two page snapshots.
//!
//! Only shown to the operator when a page changes; never persisted.

use std::time::Duration;

use similar::{ChangeTag, TextDiff};

/// Give up refining the alignment after this long; the diff stays valid,
/// only less minimal.
const DIFF_TIMEOUT: Duration = Duration::from_secs(1);

/// Unified diff of `old` against `new` with `context` lines around changes.
///
/// Returns an empty string when both texts split into the same lines.
pub fn unified_diff(old: &str, new: &str, context: usize) -> String {
    let diff = TextDiff::configure()
        .timeout(DIFF_TIMEOUT)
        .diff_lines(old, new);

    let mut unified = diff.unified_diff();
    unified.context_radius(context);

    let mut out = Vec::new();
    for hunk in unified.iter_hunks() {
        if out.is_empty() {
            out.push("--- Previous".to_string());
            out.push("+++ Current".to_string());
        }
        out.push(hunk.header().to_string());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Equal => ' ',
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
            };
            let line = change.value().trim_end_matches(['\n', '\r']);
            out.push(format!("{sign}{line}"));
        }
    }

    out.join("\n")
}
