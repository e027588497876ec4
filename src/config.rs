//! Configuration Module
//!
//! Handles loading and managing store configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Directory used for persistence files when none is configured
pub const DEFAULT_BASE_PATH: &str = "./data";

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// TTL applied by `set`; zero means entries never expire
    pub default_ttl: Duration,
    /// Directory that persistence filenames are resolved against
    pub base_path: PathBuf,
}

impl StoreConfig {
    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DB_DEFAULT_TTL` - Default TTL in whole seconds (default: 0, no expiration)
    /// - `CACHE_DB_BASE_PATH` - Persistence directory (default: `./data`)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("CACHE_DB_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::ZERO),
            base_path: env::var("CACHE_DB_BASE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PATH)),
        }
    }

    /// Sets the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the persistence directory.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
        }
    }
}
