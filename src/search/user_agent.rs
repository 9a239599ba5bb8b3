// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User-agent provisioning
//!
//! A bundled pool of realistic browser user agents, drawn from at random
//! per request so successive fetches do not share a fingerprint. The pool
//! is an explicitly constructed, injectable object; there is no hidden
//! process-wide cache.

use rand::Rng;

/// Used when the bundled list provisions nothing.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BUNDLED_USER_AGENTS: &str = include_str!("user_agents.txt");

/// Supplies one user-agent string per request.
pub trait UserAgentSource: Send + Sync {
    fn next(&self) -> String;
}

/// [`UserAgentSource`] over the bundled list, never empty.
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    pub fn new() -> Self {
        let mut agents: Vec<String> = BUNDLED_USER_AGENTS
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if agents.is_empty() {
            agents.push(DEFAULT_USER_AGENT.to_string());
        }

        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self::new()
    }
}

impl UserAgentSource for UserAgentPool {
    fn next(&self) -> String {
        let idx = rand::thread_rng().gen_range(0..self.agents.len());
        self.agents[idx].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_is_never_empty() {
        let pool = UserAgentPool::new();
        assert!(pool.len() >= 1);
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_next_returns_pool_member() {
        let pool = UserAgentPool::new();
        for _ in 0..20 {
            let ua = pool.next();
            assert!(!ua.is_empty());
            assert!(pool.agents.contains(&ua));
        }
    }

    #[test]
    fn test_bundled_entries_look_like_browsers() {
        let pool = UserAgentPool::new();
        assert!(pool.agents.iter().all(|ua| ua.starts_with("Mozilla/")));
    }
}
