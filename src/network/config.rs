// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network module configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cache behavior applied to browsing contexts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBehavior {
    #[default]
    Default,
    Bypass,
}

impl CacheBehavior {
    pub fn is_bypass(self) -> bool {
        self == CacheBehavior::Bypass
    }
}

/// Network module configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// How long a redirected request id waits for its replayed notification
    pub redirect_dedup_ttl: Duration,
    /// Forward auth challenges that no intercept blocks to the platform
    pub forward_unblocked_auth: bool,
    /// Session-wide cache behavior at startup
    pub default_cache_behavior: CacheBehavior,
    /// Warn once more exchanges than this are suspended at the same time
    pub max_blocked_exchanges: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            redirect_dedup_ttl: Duration::from_secs(30),
            forward_unblocked_auth: true,
            default_cache_behavior: CacheBehavior::Default,
            max_blocked_exchanges: 10_000,
        }
    }
}

impl NetworkConfig {
    /// Create a new network config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set redirect marker lifetime
    pub fn redirect_dedup_ttl(mut self, ttl: Duration) -> Self {
        self.redirect_dedup_ttl = ttl;
        self
    }

    /// Enable/disable forwarding of unblocked auth challenges
    pub fn forward_unblocked_auth(mut self, forward: bool) -> Self {
        self.forward_unblocked_auth = forward;
        self
    }

    /// Set initial cache behavior
    pub fn default_cache_behavior(mut self, behavior: CacheBehavior) -> Self {
        self.default_cache_behavior = behavior;
        self
    }

    /// Set soft limit on suspended exchanges
    pub fn max_blocked_exchanges(mut self, max: usize) -> Self {
        self.max_blocked_exchanges = max;
        self
    }

    /// Create config for test harnesses: short redirect markers, small soft cap
    pub fn for_testing() -> Self {
        Self {
            redirect_dedup_ttl: Duration::from_millis(200),
            max_blocked_exchanges: 64,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.redirect_dedup_ttl, Duration::from_secs(30));
        assert!(config.forward_unblocked_auth);
        assert_eq!(config.default_cache_behavior, CacheBehavior::Default);
    }

    #[test]
    fn test_builder() {
        let config = NetworkConfig::new()
            .forward_unblocked_auth(false)
            .default_cache_behavior(CacheBehavior::Bypass)
            .max_blocked_exchanges(3);
        assert!(!config.forward_unblocked_auth);
        assert!(config.default_cache_behavior.is_bypass());
        assert_eq!(config.max_blocked_exchanges, 3);
    }

    #[test]
    fn test_cache_behavior_wire_names() {
        let behavior: CacheBehavior = serde_json::from_str("\"bypass\"").unwrap();
        assert_eq!(behavior, CacheBehavior::Bypass);
        assert!(serde_json::from_str::<CacheBehavior>("\"force\"").is_err());
    }
}
