//! Resolver configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, ShieldError};

/// Role-decision cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache role-default lookups
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of entries in the cache
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Time-to-live for cached role decisions, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// TTL as a `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Shield configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl ShieldConfig {
    /// Parse a configuration from TOML
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ShieldConfig = toml::from_str(contents)
            .map_err(|e| ShieldError::InvalidInput(format!("invalid shield config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache.enabled && self.cache.capacity == 0 {
            return Err(ShieldError::InvalidInput(
                "cache capacity must be positive when the cache is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool { true }
fn default_capacity() -> usize { 10_000 }
fn default_ttl_secs() -> u64 { 300 }
