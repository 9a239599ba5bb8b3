// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! The pagination-and-deduplication search stream
//!
//! A lazy, pull-based stream over successive result pages: build the next
//! page URL, pause, fetch, extract, filter, dedup, yield. Pages are fetched
//! strictly in increasing offset order and only when the consumer pulls;
//! dropping the stream performs no further fetch.
//!
//! Termination: configured stop count reached (possibly mid-page), a page
//! with zero extracted candidates (the provider's end-of-results signal),
//! or any fetch failure. Fetch failures end the stream silently from the
//! consumer's point of view; results already yielded stand.

use std::collections::HashSet;
use std::sync::Arc;

use async_stream::stream;
use futures::pin_mut;
use futures::Stream;
use futures::StreamExt;
use reqwest::cookie::Jar;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::extractor::{GoogleHtmlExtractor, LinkExtractor};
use super::fetcher::{HttpFetcher, PageFetcher, DEFAULT_FETCH_TIMEOUT};
use super::filter::filter_link;
use super::settings::SearchSettings;
use super::types::{SearchError, SearchResultItem};
use super::url::build_search_url;
use super::user_agent::{UserAgentPool, UserAgentSource};

/// Run a search with the default HTTP fetcher, Google extractor, and
/// bundled user-agent pool.
///
/// The cookie store is the caller's if one was supplied, otherwise a fresh
/// store scoped to this search. Fails only on settings-level problems,
/// before any network activity.
pub fn search(
    query: impl Into<String>,
    settings: SearchSettings,
) -> Result<impl Stream<Item = SearchResultItem>, SearchError> {
    let jar = settings
        .cookie_jar
        .clone()
        .unwrap_or_else(|| Arc::new(Jar::default()));
    let fetcher = Arc::new(HttpFetcher::new(jar, DEFAULT_FETCH_TIMEOUT)?);

    Ok(search_with(
        query.into(),
        settings,
        fetcher,
        Arc::new(GoogleHtmlExtractor),
        Arc::new(UserAgentPool::new()),
    ))
}

/// Run a search with explicit collaborators.
pub fn search_with(
    query: String,
    settings: SearchSettings,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    user_agents: Arc<dyn UserAgentSource>,
) -> impl Stream<Item = SearchResultItem> {
    stream! {
        let mut offset = settings.start;
        let mut count: usize = 0;
        let mut seen: HashSet<String> = HashSet::new();

        'pages: loop {
            if settings.stop.is_some_and(|stop| count >= stop) {
                break 'pages;
            }

            let user_agent = settings
                .user_agent
                .clone()
                .unwrap_or_else(|| user_agents.next());
            let url = build_search_url(&query, &settings, offset);

            // Unconditional pacing, before every fetch including the first.
            sleep(settings.pause).await;

            debug!(url = %url, user_agent = %user_agent, "fetching result page");
            let html = match fetcher.fetch(url.as_str(), &user_agent).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(error = %e, url = %url, "fetch failed, ending search stream");
                    break 'pages;
                }
            };

            let candidates = extractor.extract(&html);
            debug!(candidates = candidates.len(), offset, "page extracted");

            for candidate in &candidates {
                let Some(link) = filter_link(&candidate.href, settings.include_google_links)
                else {
                    continue;
                };
                if !seen.insert(link.clone()) {
                    continue;
                }

                count += 1;
                yield SearchResultItem {
                    link,
                    title: candidate.title.clone(),
                    snippet: candidate.snippet.clone(),
                };

                if settings.stop.is_some_and(|stop| count >= stop) {
                    debug!(count, "stop count reached");
                    break 'pages;
                }
            }

            if candidates.is_empty() {
                debug!(count, "no candidates on page, end of results");
                break 'pages;
            }

            offset += settings.num;
        }

        info!(total = count, "search stream finished");
    }
}

/// "I'm Feeling Lucky": the first result for a query, or `None` when the
/// query produces nothing.
pub async fn lucky(
    query: impl Into<String>,
    settings: SearchSettings,
) -> Result<Option<SearchResultItem>, SearchError> {
    let mut settings = settings;
    settings.num = 1;
    settings.stop = Some(1);

    let results = search(query, settings)?;
    pin_mut!(results);
    Ok(results.next().await)
}

/// [`lucky`] with explicit collaborators.
pub async fn lucky_with(
    query: String,
    settings: SearchSettings,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    user_agents: Arc<dyn UserAgentSource>,
) -> Option<SearchResultItem> {
    let mut settings = settings;
    settings.num = 1;
    settings.stop = Some(1);

    let results = search_with(query, settings, fetcher, extractor, user_agents);
    pin_mut!(results);
    results.next().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::RawResultCandidate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves a scripted sequence of pages, then empty pages.
    struct ScriptedFetcher {
        pages: Vec<Result<String, SearchError>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<String, SearchError>>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, _url: &str, _user_agent: &str) -> Result<String, SearchError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(idx) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(e)) => Err(SearchError::Network {
                    message: e.to_string(),
                }),
                None => Ok(String::new()),
            }
        }
    }

    /// Treats each non-empty line of "html" as `href|title`.
    struct LineExtractor;

    impl LinkExtractor for LineExtractor {
        fn extract(&self, html: &str) -> Vec<RawResultCandidate> {
            html.lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| {
                    let (href, title) = l.split_once('|').unwrap_or((l, ""));
                    RawResultCandidate {
                        href: href.trim().to_string(),
                        title: title.trim().to_string(),
                        snippet: String::new(),
                    }
                })
                .collect()
        }
    }

    struct FixedAgent;

    impl UserAgentSource for FixedAgent {
        fn next(&self) -> String {
            "test-agent".to_string()
        }
    }

    fn fast_settings() -> SearchSettings {
        SearchSettings::builder()
            .pause(Duration::ZERO)
            .build()
            .unwrap()
    }

    fn run_search(
        pages: Vec<Result<String, SearchError>>,
        settings: SearchSettings,
    ) -> (Arc<ScriptedFetcher>, impl Stream<Item = SearchResultItem>) {
        let fetcher = Arc::new(ScriptedFetcher::new(pages));
        let stream = search_with(
            "query".to_string(),
            settings,
            fetcher.clone(),
            Arc::new(LineExtractor),
            Arc::new(FixedAgent),
        );
        (fetcher, stream)
    }

    #[tokio::test]
    async fn test_stop_count_yields_exactly_n() {
        let page = "https://example.com/1|one\nhttps://example.com/2|two\nhttps://example.com/3|three";
        let settings = SearchSettings::builder()
            .pause(Duration::ZERO)
            .stop(2usize)
            .build()
            .unwrap();
        let (fetcher, stream) = run_search(vec![Ok(page.to_string())], settings);

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://example.com/1");
        assert_eq!(results[1].link, "https://example.com/2");
        // Stop reached mid-page: no second fetch.
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cross_page_ordering() {
        let page1 = "https://example.com/a|a\nhttps://example.com/b|b";
        let page2 = "https://example.com/c|c\nhttps://example.com/d|d";
        let (_, stream) = run_search(
            vec![Ok(page1.to_string()), Ok(page2.to_string())],
            fast_settings(),
        );

        let links: Vec<String> = stream.map(|r| r.link).collect().await;
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
                "https://example.com/d",
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_links_yielded_once() {
        let page = "https://example.com/same|first";
        let (_, stream) = run_search(
            vec![Ok(page.to_string()), Ok(page.to_string())],
            fast_settings(),
        );

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "first");
    }

    #[tokio::test]
    async fn test_empty_first_page_terminates_immediately() {
        let (fetcher, stream) = run_search(vec![Ok(String::new())], fast_settings());

        let results: Vec<_> = stream.collect().await;
        assert!(results.is_empty());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_page_after_results_terminates() {
        let page = "https://example.com/a|a";
        let (fetcher, stream) = run_search(
            vec![Ok(page.to_string()), Ok(String::new())],
            fast_settings(),
        );

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 1);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_ends_stream_keeping_prior_results() {
        let page = "https://example.com/a|a\nhttps://example.com/b|b";
        let (_, stream) = run_search(
            vec![
                Ok(page.to_string()),
                Err(SearchError::Network {
                    message: "connection reset".to_string(),
                }),
            ],
            fast_settings(),
        );

        // The failure surfaces as stream termination, never as a value.
        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_filtered_links_not_yielded() {
        let page = "\
            https://www.google.com/maps|maps\n\
            /relative/path|rel\n\
            https://example.com/keep|keep";
        let (_, stream) = run_search(vec![Ok(page.to_string()), Ok(String::new())], fast_settings());

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link, "https://example.com/keep");
    }

    #[tokio::test]
    async fn test_redirect_references_resolved_before_dedup() {
        // Same target via redirect wrapper and direct link: one emission.
        let page = "\
            /url?q=https://example.com/a&sa=U|wrapped\n\
            https://example.com/a|direct";
        let (_, stream) = run_search(vec![Ok(page.to_string()), Ok(String::new())], fast_settings());

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "wrapped");
    }

    #[tokio::test]
    async fn test_offset_advances_by_page_size() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![]));

        struct UrlRecorder {
            inner: Arc<ScriptedFetcher>,
            urls: std::sync::Mutex<Vec<String>>,
        }

        #[async_trait]
        impl PageFetcher for UrlRecorder {
            async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, SearchError> {
                self.urls.lock().unwrap().push(url.to_string());
                let page = if self.inner.call_count() < 2 {
                    "https://example.com/p|p"
                } else {
                    ""
                };
                let _ = self.inner.fetch(url, user_agent).await;
                Ok(page.to_string())
            }
        }

        let recorder = Arc::new(UrlRecorder {
            inner: fetcher,
            urls: std::sync::Mutex::new(Vec::new()),
        });

        let settings = SearchSettings::builder()
            .pause(Duration::ZERO)
            .num(20)
            .build()
            .unwrap();
        let stream = search_with(
            "query".to_string(),
            settings,
            recorder.clone(),
            Arc::new(LineExtractor),
            Arc::new(FixedAgent),
        );
        let _: Vec<_> = stream.collect().await;

        let urls = recorder.urls.lock().unwrap().clone();
        assert!(urls[0].contains("num=20"));
        assert!(!urls[0].contains("start="));
        assert!(urls[1].contains("start=20"));
        assert!(urls[2].contains("start=40"));
    }

    #[tokio::test]
    async fn test_lazy_pull_no_fetch_after_last_request() {
        let page = "https://example.com/a|a";
        let (fetcher, stream) = run_search(
            vec![Ok(page.to_string()), Ok(page.to_string())],
            fast_settings(),
        );

        pin_mut!(stream);
        let first = stream.next().await;
        assert!(first.is_some());
        drop(stream);

        // Only the page that produced the pulled value was fetched.
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_explicit_user_agent_overrides_pool() {
        struct AgentRecorder {
            agents: std::sync::Mutex<Vec<String>>,
        }

        #[async_trait]
        impl PageFetcher for AgentRecorder {
            async fn fetch(&self, _url: &str, user_agent: &str) -> Result<String, SearchError> {
                self.agents.lock().unwrap().push(user_agent.to_string());
                Ok(String::new())
            }
        }

        let recorder = Arc::new(AgentRecorder {
            agents: std::sync::Mutex::new(Vec::new()),
        });
        let settings = SearchSettings::builder()
            .pause(Duration::ZERO)
            .user_agent("explicit-agent")
            .build()
            .unwrap();
        let stream = search_with(
            "query".to_string(),
            settings,
            recorder.clone(),
            Arc::new(LineExtractor),
            Arc::new(FixedAgent),
        );
        let _: Vec<_> = stream.collect().await;

        assert_eq!(
            recorder.agents.lock().unwrap().as_slice(),
            &["explicit-agent".to_string()]
        );
    }

    #[tokio::test]
    async fn test_lucky_returns_first_result() {
        let page = "https://example.com/first|first\nhttps://example.com/second|second";
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(page.to_string())]));
        let result = lucky_with(
            "query".to_string(),
            fast_settings(),
            fetcher,
            Arc::new(LineExtractor),
            Arc::new(FixedAgent),
        )
        .await;

        let item = result.unwrap();
        assert_eq!(item.link, "https://example.com/first");
    }

    #[tokio::test]
    async fn test_lucky_empty_is_none_not_error() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(String::new())]));
        let result = lucky_with(
            "query".to_string(),
            fast_settings(),
            fetcher,
            Arc::new(LineExtractor),
            Arc::new(FixedAgent),
        )
        .await;

        assert!(result.is_none());
    }
}
