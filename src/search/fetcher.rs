// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page fetching
//!
//! One HTTP GET per result page with browser-like headers, a cookie store
//! scoped to the search (or shared by the caller), transparent redirect
//! following, and charset-aware body decoding.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::header;
use reqwest::Client;
use tracing::debug;

use super::types::SearchError;

/// Default per-request deadline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches one result page and decodes it to text.
///
/// Implementations must attach the given user agent, carry cookies across
/// requests, follow redirects, treat non-2xx statuses as failures, and
/// report timeouts distinctly from other transport failures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, SearchError>;
}

/// [`PageFetcher`] backed by reqwest with a cookie store.
///
/// The cookie store attaches a `Cookie` header per request URL and absorbs
/// `Set-Cookie` responses keyed by the final post-redirect URL; both are
/// reqwest cookie-provider semantics.
pub struct HttpFetcher {
    client: Client,
    timeout_ms: u64,
}

impl HttpFetcher {
    /// Create a fetcher around the given cookie store.
    pub fn new(cookie_jar: Arc<Jar>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .cookie_provider(cookie_jar)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SearchError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout {
                        timeout_ms: self.timeout_ms,
                        url: url.to_string(),
                    }
                } else {
                    SearchError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout {
                    timeout_ms: self.timeout_ms,
                    url: url.to_string(),
                }
            } else {
                SearchError::Network {
                    message: e.to_string(),
                }
            }
        })?;

        debug!(url, bytes = bytes.len(), "result page fetched");

        Ok(decode_body(&bytes, content_type.as_deref()))
    }
}

/// Decode a response body to text.
///
/// Charset precedence: the `Content-Type` header, then a `<meta>` hint in
/// the document prefix, then UTF-8 (lossy).
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let label = content_type
        .and_then(charset_from_content_type)
        .or_else(|| sniff_meta_charset(bytes));

    match label.as_deref().and_then(|l| Encoding::for_label(l.as_bytes())) {
        Some(encoding) => encoding.decode(bytes).0.into_owned(),
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r#"(?i)charset=["']?([\w-]+)"#).ok())
        .as_ref()?;
    re.captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE
        .get_or_init(|| Regex::new(r#"(?i)<meta[^>]*?charset=["']?([\w-]+)["']?"#).ok())
        .as_ref()?;

    // Charset declarations sit in the head; a bounded prefix is enough.
    let prefix_len = bytes.len().min(2048);
    let prefix: String = bytes[..prefix_len].iter().map(|&b| b as char).collect();
    re.captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}
