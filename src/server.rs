// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! MCP tool boundary
//!
//! Serves `google_search` and `google_lucky` over stdio. This layer drives
//! the search stream to completion (or its bounded count) and returns one
//! structured response; it never streams partial results, and it converts
//! every error into a text payload with the error flag set.

use std::sync::Arc;

use futures::pin_mut;
use futures::StreamExt;
use reqwest::cookie::Jar;
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use crate::search::{
    lucky_with, search_with, GoogleHtmlExtractor, HttpFetcher, SafeSearch, SearchError,
    SearchSettings, UserAgentPool, DEFAULT_FETCH_TIMEOUT,
};

/// Arguments accepted by the `google_search` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchToolArgs {
    /// Search query to find relevant content
    pub query: String,
    /// Results per page (default: 10)
    pub num: Option<usize>,
    /// Start index for results (default: 0)
    pub start: Option<usize>,
    /// Stop after this many results (default: unbounded)
    pub stop: Option<usize>,
    /// Result language code, e.g. "en" (default: "en")
    pub lang: Option<String>,
    /// Google domain suffix, e.g. "com" or "co.uk" (default: "com")
    pub tld: Option<String>,
    /// Time filter, e.g. "qdr:d" for past day (default: none)
    pub tbs: Option<String>,
    /// Enable safe search (default: false)
    pub safe: Option<bool>,
    /// Country code for the `cr` parameter (default: none)
    pub country: Option<String>,
    /// Pause before each page fetch in milliseconds (default: 2000)
    pub pause_ms: Option<u64>,
    /// Include links back to Google properties (default: false)
    pub include_google_links: Option<bool>,
}

/// Arguments accepted by the `google_lucky` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LuckyToolArgs {
    /// Search query to find relevant content
    pub query: String,
    /// Result language code, e.g. "en" (default: "en")
    pub lang: Option<String>,
    /// Google domain suffix, e.g. "com" or "co.uk" (default: "com")
    pub tld: Option<String>,
    /// Pause before each page fetch in milliseconds (default: 2000)
    pub pause_ms: Option<u64>,
}

/// MCP server exposing the search stream as tools.
#[derive(Clone)]
pub struct GoogleSearchServer {
    tool_router: ToolRouter<Self>,
    user_agents: Arc<UserAgentPool>,
}

fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

#[tool_router]
impl GoogleSearchServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
            user_agents: Arc::new(UserAgentPool::new()),
        }
    }

    fn settings_from_args(args: &SearchToolArgs) -> Result<SearchSettings, SearchError> {
        let mut builder = SearchSettings::builder();
        if let Some(num) = args.num {
            builder = builder.num(num);
        }
        if let Some(start) = args.start {
            builder = builder.start(start);
        }
        if let Some(stop) = args.stop {
            builder = builder.stop(stop);
        }
        if let Some(ref lang) = args.lang {
            builder = builder.lang(lang.clone());
        }
        if let Some(ref tld) = args.tld {
            builder = builder.tld(tld.clone());
        }
        if let Some(ref tbs) = args.tbs {
            builder = builder.tbs(tbs.clone());
        }
        if args.safe == Some(true) {
            builder = builder.safe(SafeSearch::On);
        }
        if let Some(ref country) = args.country {
            builder = builder.country(country.clone());
        }
        if let Some(pause_ms) = args.pause_ms {
            builder = builder.pause(std::time::Duration::from_millis(pause_ms));
        }
        if args.include_google_links == Some(true) {
            builder = builder.include_google_links(true);
        }
        builder.build()
    }

    fn fresh_fetcher() -> Result<HttpFetcher, SearchError> {
        // One cookie store per tool call, dropped with the call.
        HttpFetcher::new(Arc::new(Jar::default()), DEFAULT_FETCH_TIMEOUT)
    }

    #[tool(
        description = "Perform a Google search and return result links with titles and snippets"
    )]
    async fn google_search(
        &self,
        params: Parameters<SearchToolArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        if args.query.trim().is_empty() {
            return Ok(error_result("Error: query must be non-empty"));
        }

        let settings = match Self::settings_from_args(&args) {
            Ok(settings) => settings,
            Err(e) => return Ok(error_result(format!("Error: {e}"))),
        };
        let fetcher = match Self::fresh_fetcher() {
            Ok(fetcher) => Arc::new(fetcher),
            Err(e) => return Ok(error_result(format!("Error: {e}"))),
        };

        let results = search_with(
            args.query.clone(),
            settings,
            fetcher,
            Arc::new(GoogleHtmlExtractor),
            self.user_agents.clone(),
        );
        pin_mut!(results);

        let mut collected = Vec::new();
        while let Some(item) = results.next().await {
            collected.push(item);
        }

        info!(query = %args.query, results = collected.len(), "google_search complete");

        if collected.is_empty() {
            return Ok(error_result("No results found"));
        }

        let payload = serde_json::json!({
            "results": collected,
            "resultCount": collected.len(),
        });
        Ok(CallToolResult::success(vec![Content::text(
            payload.to_string(),
        )]))
    }

    #[tool(description = "I'm Feeling Lucky: return only the first result link for a query")]
    async fn google_lucky(
        &self,
        params: Parameters<LuckyToolArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0;
        if args.query.trim().is_empty() {
            return Ok(error_result("Error: query must be non-empty"));
        }

        let settings = match Self::settings_from_args(&SearchToolArgs {
            query: args.query.clone(),
            lang: args.lang.clone(),
            tld: args.tld.clone(),
            pause_ms: args.pause_ms,
            ..Default::default()
        }) {
            Ok(settings) => settings,
            Err(e) => return Ok(error_result(format!("Error: {e}"))),
        };
        let fetcher = match Self::fresh_fetcher() {
            Ok(fetcher) => Arc::new(fetcher),
            Err(e) => return Ok(error_result(format!("Error: {e}"))),
        };

        let item = lucky_with(
            args.query.clone(),
            settings,
            fetcher,
            Arc::new(GoogleHtmlExtractor),
            self.user_agents.clone(),
        )
        .await;

        match item {
            Some(item) => {
                let payload = serde_json::json!({ "result": item });
                Ok(CallToolResult::success(vec![Content::text(
                    payload.to_string(),
                )]))
            }
            None => Ok(error_result("No results found")),
        }
    }
}

impl Default for GoogleSearchServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for GoogleSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Scrapes Google result pages. google_search returns the full collected \
                 result list; google_lucky returns only the first result."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serve the tools on stdio until the client disconnects.
pub async fn serve_stdio() -> Result<(), McpError> {
    let service = GoogleSearchServer::new();
    let running = service
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(())
}
