// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google result-page scraper exposed as an MCP tool.
//!
//! The library half is the search stream itself ([`search`]); the binary
//! half serves it over the Model Context Protocol on stdio ([`server`]).

pub mod search;
pub mod server;

pub use search::{
    lucky, search as search_stream, SafeSearch, SearchError, SearchResultItem, SearchSettings,
};
pub use server::GoogleSearchServer;
