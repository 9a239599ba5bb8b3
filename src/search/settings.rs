// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-search configuration
//!
//! Settings are immutable for the duration of one search call and are
//! validated once, at construction, before any network activity.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

use super::types::SearchError;

/// The provider's default page size. `num` is only sent when it differs.
pub const DEFAULT_NUM: usize = 10;

/// Default pause before every page fetch.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(2000);

/// Query parameters set by the URL builder. Caller-supplied extra
/// parameters must not collide with these.
pub const RESERVED_PARAMS: [&str; 10] = [
    "hl", "q", "lr", "num", "btnG", "start", "tbs", "safe", "cr", "filter",
];

/// Safe-search mode sent as the `safe` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SafeSearch {
    On,
    #[default]
    Off,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

/// Immutable settings for one search invocation.
///
/// Build through [`SearchSettings::builder`]; `build()` runs the validation
/// pass and fails fast on reserved-parameter collisions or an unusable
/// domain suffix.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Domain suffix, e.g. "com" or "co.uk"
    pub tld: String,
    /// Result language filter, sent as `lr=lang_{lang}`
    pub lang: String,
    /// Time-range filter (`tbs` parameter), "0" for none
    pub tbs: String,
    /// Safe-search mode
    pub safe: SafeSearch,
    /// Results per page
    pub num: usize,
    /// Starting offset of the first page
    pub start: usize,
    /// Stop after this many results; None means unbounded
    pub stop: Option<usize>,
    /// Pause before every page fetch, including the first
    pub pause: Duration,
    /// Country code (`cr` parameter), empty for none
    pub country: String,
    /// Extra query parameters, merged after the reserved ones
    pub extra_params: BTreeMap<String, String>,
    /// Explicit user agent; None means a random draw per request
    pub user_agent: Option<String>,
    /// Whether Google-internal links may appear in the output
    pub include_google_links: bool,
    /// Caller-supplied cookie store; None means a fresh one per search
    pub cookie_jar: Option<Arc<Jar>>,
    /// Validated base search URL, derived from `tld` at build time
    pub(crate) base_url: Url,
}

impl SearchSettings {
    pub fn builder() -> SearchSettingsBuilder {
        SearchSettingsBuilder::new()
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        // No extra params and a known-good tld, so validation cannot fail.
        SearchSettingsBuilder::new()
            .build()
            .expect("default settings are always valid")
    }
}

/// Builder for [`SearchSettings`] with documented defaults.
#[derive(Debug, Clone)]
pub struct SearchSettingsBuilder {
    tld: String,
    lang: String,
    tbs: String,
    safe: SafeSearch,
    num: usize,
    start: usize,
    stop: Option<usize>,
    pause: Duration,
    country: String,
    extra_params: BTreeMap<String, String>,
    user_agent: Option<String>,
    include_google_links: bool,
    cookie_jar: Option<Arc<Jar>>,
}

impl SearchSettingsBuilder {
    pub fn new() -> Self {
        Self {
            tld: "com".to_string(),
            lang: "en".to_string(),
            tbs: "0".to_string(),
            safe: SafeSearch::Off,
            num: DEFAULT_NUM,
            start: 0,
            stop: None,
            pause: DEFAULT_PAUSE,
            country: String::new(),
            extra_params: BTreeMap::new(),
            user_agent: None,
            include_google_links: false,
            cookie_jar: None,
        }
    }

    pub fn tld(mut self, tld: impl Into<String>) -> Self {
        self.tld = tld.into();
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn tbs(mut self, tbs: impl Into<String>) -> Self {
        self.tbs = tbs.into();
        self
    }

    pub fn safe(mut self, safe: SafeSearch) -> Self {
        self.safe = safe;
        self
    }

    pub fn num(mut self, num: usize) -> Self {
        self.num = num;
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn stop(mut self, stop: impl Into<Option<usize>>) -> Self {
        self.stop = stop.into();
        self
    }

    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn extra_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(name.into(), value.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn include_google_links(mut self, include: bool) -> Self {
        self.include_google_links = include;
        self
    }

    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Validate and produce the settings.
    ///
    /// Fails with [`SearchError::ReservedParam`] when an extra parameter
    /// collides with a built-in one, or [`SearchError::InvalidTld`] when the
    /// domain suffix does not form a parseable search URL.
    pub fn build(self) -> Result<SearchSettings, SearchError> {
        for name in RESERVED_PARAMS {
            if self.extra_params.contains_key(name) {
                return Err(SearchError::ReservedParam {
                    name: name.to_string(),
                });
            }
        }

        let base = format!("https://www.google.{}/search", self.tld);
        let base_url = Url::parse(&base).map_err(|_| SearchError::InvalidTld {
            tld: self.tld.clone(),
        })?;
        if base_url.host_str() != Some(&format!("www.google.{}", self.tld)) {
            return Err(SearchError::InvalidTld { tld: self.tld });
        }

        Ok(SearchSettings {
            tld: self.tld,
            lang: self.lang,
            tbs: self.tbs,
            safe: self.safe,
            num: self.num,
            start: self.start,
            stop: self.stop,
            pause: self.pause,
            country: self.country,
            extra_params: self.extra_params,
            user_agent: self.user_agent,
            include_google_links: self.include_google_links,
            cookie_jar: self.cookie_jar,
            base_url,
        })
    }
}

impl Default for SearchSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
