// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Result-page URL construction
//!
//! One of four URL shapes is produced, selected by two independent binary
//! choices: first page (offset zero) vs subsequent page, and default page
//! size vs custom. `num` is only sent for a custom page size and `start`
//! only for a nonzero offset; everything else is always present.

use url::Url;

use super::settings::{SearchSettings, DEFAULT_NUM};

/// Build the request URL for one result page.
///
/// Reserved parameters are set first, caller-supplied extras last; the
/// builder has already rejected extras that collide with reserved names.
/// The query text is percent-encoded exactly once by the serializer.
pub fn build_search_url(query: &str, settings: &SearchSettings, offset: usize) -> Url {
    let mut url = settings.base_url.clone();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("lr", &format!("lang_{}", settings.lang));
        pairs.append_pair("q", query);
        pairs.append_pair("tbs", &settings.tbs);
        pairs.append_pair("safe", settings.safe.as_str());
        if !settings.country.is_empty() {
            pairs.append_pair("cr", &settings.country);
        }
        if settings.num != DEFAULT_NUM {
            pairs.append_pair("num", &settings.num.to_string());
        }
        if offset > 0 {
            pairs.append_pair("start", &offset.to_string());
        }
        // Keep the provider from folding near-duplicate results.
        pairs.append_pair("filter", "0");
        for (name, value) in &settings.extra_params {
            pairs.append_pair(name, value);
        }
    }

    url
}
