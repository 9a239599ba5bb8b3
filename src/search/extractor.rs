// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Candidate link extraction from result-page HTML
//!
//! Tries structured result containers first and degrades to a broad anchor
//! sweep when the markup has drifted. Never errors; an unrecognizable page
//! yields an empty candidate list.

use scraper::{ElementRef, Html, Selector};

use super::types::RawResultCandidate;

/// Extracts candidate result links, titles, and snippets from one page.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Vec<RawResultCandidate>;
}

/// [`LinkExtractor`] for Google result-page markup.
///
/// Tier 1: organic result containers (`div.g`) with an `h3` title and a
/// snippet element. Tier 2, when no containers match: every anchor whose
/// href looks like a result reference. Duplicate links may appear in the
/// output; deduplication belongs to the search stream.
pub struct GoogleHtmlExtractor;

impl LinkExtractor for GoogleHtmlExtractor {
    fn extract(&self, html: &str) -> Vec<RawResultCandidate> {
        let document = Html::parse_document(html);

        let candidates = extract_result_blocks(&document);
        if !candidates.is_empty() {
            return candidates;
        }
        extract_bare_anchors(&document)
    }
}

fn sel(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_result_blocks(document: &Html) -> Vec<RawResultCandidate> {
    let Some(block_sel) = sel("div.g") else {
        return Vec::new();
    };
    let Some(title_sel) = sel("h3") else {
        return Vec::new();
    };
    let Some(link_sel) = sel("a[href]") else {
        return Vec::new();
    };
    // Snippet class names rotate; try the ones seen in the wild.
    let snippet_sel = sel(".VwiC3b, div[data-sncf], .lEBKkf span, .IsZvec");

    let mut candidates = Vec::new();

    for block in document.select(&block_sel) {
        let Some(title_el) = block.select(&title_sel).next() else {
            continue;
        };
        let title = element_text(&title_el);
        if title.is_empty() {
            continue;
        }

        let Some(href) = block
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let snippet = snippet_sel
            .as_ref()
            .and_then(|s| block.select(s).next())
            .map(|el| element_text(&el))
            .unwrap_or_default();

        candidates.push(RawResultCandidate {
            href: href.to_string(),
            title,
            snippet,
        });
    }

    candidates
}

fn extract_bare_anchors(document: &Html) -> Vec<RawResultCandidate> {
    let Some(anchor_sel) = sel("a[href]") else {
        return Vec::new();
    };

    document
        .select(&anchor_sel)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.starts_with("/url?") && !href.starts_with("http") {
                return None;
            }
            Some(RawResultCandidate {
                href: href.to_string(),
                title: element_text(&anchor),
                snippet: String::new(),
            })
        })
        .collect()
}
