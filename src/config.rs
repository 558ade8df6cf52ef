//! Engine configuration
//!
//! Everything time- or size-bounded in the sync engine is driven from
//! here: the settle window, query timeouts, and the dynamic-album
//! evaluation ceilings. Values can be loaded from a TOML file or used
//! with their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Top-level sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Rows mutated within this window of "now" are excluded from every
    /// scan, so a cursor never advances past an in-flight sibling
    /// transaction that could still commit a smaller change id.
    pub settle_window_ms: u64,

    /// Upper bound for any single scan or filter evaluation.
    pub query_timeout_ms: u64,

    /// Dynamic-album evaluation limits and caching.
    pub dynamic_albums: DynamicAlbumConfig,
}

/// Limits for computed (dynamic) album membership
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicAlbumConfig {
    /// Page size used when evaluating a dynamic album for sync. Must
    /// cover the practical per-owner asset ceiling, since membership is
    /// filtered client-side of the query by update id.
    pub page_ceiling: u64,

    /// TTL for the filter-conversion cache.
    pub filter_cache_ttl_ms: u64,

    /// Maximum number of `(owner, filters)` entries kept in the cache.
    pub filter_cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_window_ms: 1_000,
            query_timeout_ms: 30_000,
            dynamic_albums: DynamicAlbumConfig::default(),
        }
    }
}

impl Default for DynamicAlbumConfig {
    fn default() -> Self {
        Self {
            page_ceiling: 50_000,
            filter_cache_ttl_ms: 5 * 60 * 1_000,
            filter_cache_capacity: 512,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any missing field.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&raw)?;
        info!("Loaded sync config from {:?}", path);
        Ok(config)
    }

    pub fn settle_window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.settle_window_ms as i64)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn filter_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.dynamic_albums.filter_cache_ttl_ms)
    }
}

/// Configuration load errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SyncConfig::default();
        assert_eq!(config.settle_window_ms, 1_000);
        assert_eq!(config.dynamic_albums.page_ceiling, 50_000);
        assert!(config.dynamic_albums.filter_cache_capacity > 0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SyncConfig = toml::from_str("settle_window_ms = 2000").unwrap();
        assert_eq!(config.settle_window_ms, 2_000);
        assert_eq!(config.query_timeout_ms, 30_000);
    }
}
