// src/services/fingerprint.rs

//! Text normalization and content fingerprinting.
//!
//! Normalized text is the document's visible text nodes, each trimmed,
//! empty ones dropped, joined by single spaces. Fingerprints are hex
//! SHA-256 digests of that text's UTF-8 bytes, so they stay comparable
//! with state written by earlier runs.

use scraper::{ElementRef, Html, Selector};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::Fingerprint;
use crate::utils::parse_selector;

/// Elements stripped from a selected region before its text is read.
const NOISE_SELECTOR: &str = "script, nav, footer";

/// Elements whose text content is never visible.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "template"];

/// One heading-keyed section of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text, whitespace-stripped
    pub heading: String,
    /// Normalized text of the heading and everything after it in its block
    pub text: String,
}

/// Digest normalized text into a fingerprint.
pub fn fingerprint(text: &str) -> Fingerprint {
    let digest = Sha256::digest(text.as_bytes());
    Fingerprint::new(hex::encode(digest))
}

/// Trimmed, non-empty visible text segments under `element`.
fn text_segments<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            })
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
}

/// Visible text under `element`, segments joined by single spaces.
pub fn visible_text(element: ElementRef<'_>) -> String {
    text_segments(element).collect::<Vec<_>>().join(" ")
}

/// Normalized text of a page, optionally restricted to a selected region.
///
/// With a selector, `script`, `nav` and `footer` elements inside the first
/// match are removed before its text is read. If the selector matches
/// nothing, or the region has no text, the whole document's text is used.
pub fn page_text(html: &str, selector: Option<&Selector>) -> Result<String> {
    let mut document = Html::parse_document(html);

    if let Some(selector) = selector {
        let selected_id = document.select(selector).next().map(|el| el.id());

        if let Some(selected_id) = selected_id {
            let noise = parse_selector(NOISE_SELECTOR)?;
            let noise_ids: Vec<_> = document
                .tree
                .get(selected_id)
                .and_then(ElementRef::wrap)
                .map(|selected| {
                    selected
                        .select(&noise)
                        .map(|el| el.id())
                        .filter(|id| *id != selected_id)
                        .collect()
                })
                .unwrap_or_default();

            for id in noise_ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }

            let text = document
                .tree
                .get(selected_id)
                .and_then(ElementRef::wrap)
                .map(visible_text)
                .unwrap_or_default();
            if !text.is_empty() {
                return Ok(text);
            }
        }
    }

    Ok(visible_text(document.root_element()))
}

/// Split a page into heading-keyed sections.
///
/// Within the first `container` match, every `section` block is searched
/// for its first `heading` element; the section text is the heading plus
/// all of its following sibling elements, re-parsed and flattened. Blocks
/// without a heading are skipped. A repeated heading keeps its first
/// position and takes the later block's text.
///
/// Returns `None` if the container selector matches nothing.
pub fn extract_sections(
    html: &str,
    container: &Selector,
    section: &Selector,
    heading: &Selector,
) -> Option<Vec<Section>> {
    let document = Html::parse_document(html);
    let container = document.select(container).next()?;

    let mut sections: Vec<Section> = Vec::new();
    for block in container.select(section) {
        let Some(heading_el) = block.select(heading).next() else {
            continue;
        };

        let title: String = text_segments(heading_el).collect();

        let mut markup = heading_el.html();
        for sibling in heading_el.next_siblings().filter_map(ElementRef::wrap) {
            markup.push_str(&sibling.html());
        }
        let fragment = Html::parse_fragment(&markup);
        let text = visible_text(fragment.root_element());

        match sections.iter_mut().find(|s| s.heading == title) {
            Some(existing) => existing.text = text,
            None => sections.push(Section {
                heading: title,
                text,
            }),
        }
    }

    Some(sections)
}
