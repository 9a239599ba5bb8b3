// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for the search stream

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single result emitted by the search stream.
///
/// The link is always an absolute URL and, unless the caller opted in to
/// Google-internal links, never points back at the provider. A link is
/// emitted at most once per search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    /// Resolved absolute link
    pub link: String,
    /// Display title of the result
    pub title: String,
    /// Snippet/description text surrounding the result
    pub snippet: String,
}

/// A candidate link as extracted from one result page, before filtering.
///
/// The href may still be a provider-internal redirect encoding
/// (`/url?q=...`). Produced transiently by the extractor, never persisted.
#[derive(Debug, Clone)]
pub struct RawResultCandidate {
    /// Link reference as found in the markup
    pub href: String,
    /// Display title, may be empty
    pub title: String,
    /// Surrounding snippet text, may be empty
    pub snippet: String,
}

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// A caller-supplied extra parameter collides with a built-in one
    #[error("GET parameter \"{name}\" is overlapping with built-in parameters")]
    ReservedParam {
        /// Name of the colliding parameter
        name: String,
    },

    /// The configured domain suffix does not form a valid search URL
    #[error("invalid top-level domain \"{tld}\"")]
    InvalidTld {
        /// The rejected domain suffix
        tld: String,
    },

    /// Non-success HTTP status from the provider
    #[error("HTTP error: {status} for {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// URL that was requested
        url: String,
    },

    /// Fetch exceeded its deadline
    #[error("request timed out after {timeout_ms}ms: {url}")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
        /// URL that was requested
        url: String,
    },

    /// Connection failure or malformed response
    #[error("network error: {message}")]
    Network {
        /// Underlying error message
        message: String,
    },
}
