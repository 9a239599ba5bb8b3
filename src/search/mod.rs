// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google result-page search
//!
//! A lazy, paced, deduplicating stream over paginated result pages:
//! - URL construction per page ([`url`])
//! - HTTP fetching with cookie persistence and charset decoding ([`fetcher`])
//! - candidate extraction from result HTML ([`extractor`])
//! - link filtering and redirect resolution ([`filter`])
//! - the orchestrating stream and lucky-search shortcut ([`stream`])

pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod settings;
pub mod stream;
pub mod time_range;
pub mod types;
pub mod url;
pub mod user_agent;

pub use extractor::{GoogleHtmlExtractor, LinkExtractor};
pub use fetcher::{HttpFetcher, PageFetcher, DEFAULT_FETCH_TIMEOUT};
pub use filter::filter_link;
pub use settings::{SafeSearch, SearchSettings, SearchSettingsBuilder, DEFAULT_NUM};
pub use stream::{lucky, lucky_with, search, search_with};
pub use time_range::tbs_for_date_range;
pub use types::{RawResultCandidate, SearchError, SearchResultItem};
pub use url::build_search_url;
pub use user_agent::{UserAgentPool, UserAgentSource, DEFAULT_USER_AGENT};
