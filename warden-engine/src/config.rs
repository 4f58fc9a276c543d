//! Runtime limits and options for the decision engine.

use serde::Deserialize;
use warden_core::MAX_PATH_HOPS;

use crate::error::PolicyError;

fn default_max_hops() -> usize { MAX_PATH_HOPS }
fn default_max_fanout() -> usize { 32 }
fn default_cache_enabled() -> bool { false }
fn default_cache_ttl() -> u64 { 30 }

/// Engine options. Every field has a default, so an empty document is valid.
///
/// ```yaml
/// authorization:
///   max_hops: 8              # default: 8
///   max_fanout: 32           # default: 32
///   cache_enabled: false     # default: false
///   cache_ttl_secs: 30       # default: 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Longest ownership path followed at decision time. Longer paths fail closed.
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    /// Most related items followed from a single relation hop. Default: 32.
    #[serde(default = "default_max_fanout")]
    pub max_fanout: usize,
    /// Whether to cache items loaded while following relations. Default: false.
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    /// Item cache TTL in seconds. Default: 30.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_fanout: default_max_fanout(),
            cache_enabled: default_cache_enabled(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    pub fn with_max_fanout(mut self, fanout: usize) -> Self {
        self.max_fanout = fanout;
        self
    }

    /// Enable or disable the item cache with the given TTL.
    pub fn with_cache(mut self, enabled: bool, ttl_secs: u64) -> Self {
        self.cache_enabled = enabled;
        self.cache_ttl_secs = ttl_secs;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_hops == 0 {
            return Err(PolicyError::InvalidConfig("max_hops must be at least 1".into()));
        }
        if self.max_hops > MAX_PATH_HOPS {
            return Err(PolicyError::InvalidConfig(format!(
                "max_hops cannot exceed {MAX_PATH_HOPS}"
            )));
        }
        if self.max_fanout == 0 {
            return Err(PolicyError::InvalidConfig("max_fanout must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.max_hops, 8);
        assert_eq!(config.max_fanout, 32);
        assert!(!config.cache_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_bounds() {
        assert!(EngineConfig::new().with_max_hops(0).validate().is_err());
        assert!(EngineConfig::new().with_max_fanout(0).validate().is_err());
        assert!(EngineConfig::new().with_max_hops(9).validate().is_err());
    }
}
