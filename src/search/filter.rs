// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result link filtering
//!
//! Decides whether one extracted link is a valid, non-infrastructure
//! result, resolving Google's `/url?q=...` redirect wrapper on the way.
//! Any parse failure means rejection; nothing escapes this module.

use url::Url;

/// Base used to resolve redirect-style references.
const PROVIDER_BASE: &str = "https://www.google.com";

/// Resolve and vet one raw link reference.
///
/// Returns the resolved absolute link, textually unchanged, or `None`.
/// Rejected: references with no embedded target, relative or malformed
/// URLs, empty hosts, Google-family hosts (unless `include_google_links`),
/// internal `/search` pages, cache mirrors, and translation proxies.
///
/// The surviving link is deliberately not re-normalized: two links that
/// differ only in casing or a trailing slash stay distinct for dedup.
pub fn filter_link(href: &str, include_google_links: bool) -> Option<String> {
    if href.is_empty() {
        return None;
    }

    let actual = if href.starts_with("/url?") {
        let base = Url::parse(PROVIDER_BASE).ok()?;
        let wrapped = base.join(href).ok()?;
        wrapped
            .query_pairs()
            .find(|(name, _)| name == "q")
            .map(|(_, value)| value.into_owned())?
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&actual).ok()?;
    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }
    if !include_google_links && host.contains("google") {
        return None;
    }
    if parsed.path().starts_with("/search")
        || host.starts_with("webcache.googleusercontent")
        || host.starts_with("translate.google")
    {
        return None;
    }

    Some(actual)
}
