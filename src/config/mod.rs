//! Layered configuration for the storage core: compiled-in defaults, an
//! optional `PageStore.toml`, then `PAGESTORE_*` environment overrides.
//!
//! Library entry points (`BufferPoolManager::new`, `BPlusTree::new`, ...)
//! take an explicit [`StorageConfig`] rather than reading process-global
//! state; this module only exists to assemble one conveniently for the demo
//! binary and for tests.

use serde::Deserialize;

use crate::common::Result;

/// Default page size, in bytes. Chosen small enough that tests can exercise
/// splits/merges with a handful of keys rather than thousands.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Size in bytes of every page, on disk and in memory.
    pub page_size: usize,
    /// Number of frames in the buffer pool.
    pub pool_size: usize,
    /// The `K` in LRU-K.
    pub replacer_k: usize,
    /// Path to the backing data file used by the disk manager.
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            page_size: DEFAULT_PAGE_SIZE,
            pool_size: 64,
            replacer_k: 2,
            data_file: "pagestore.db".to_string(),
        }
    }
}

impl StorageConfig {
    /// Loads configuration from compiled-in defaults, optionally overlaid by
    /// `config_path` (if it exists) and then by `PAGESTORE_*` environment
    /// variables (e.g. `PAGESTORE_POOL_SIZE=128`).
    pub fn load(config_path: Option<&str>) -> Result<StorageConfig> {
        let defaults = StorageConfig::default();
        let mut builder = config::Config::builder()
            .set_default("page_size", defaults.page_size as i64)?
            .set_default("pool_size", defaults.pool_size as i64)?
            .set_default("replacer_k", defaults.replacer_k as i64)?
            .set_default("data_file", defaults.data_file.clone())?;

        if let Some(path) = config_path {
            if std::path::Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("PAGESTORE"))
            .build()
            .map_err(|e| crate::common::Error::Internal(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::common::Error::Internal(e.to_string()))
    }
}

impl From<config::ConfigError> for crate::common::Error {
    fn from(e: config::ConfigError) -> Self {
        crate::common::Error::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_file_or_env() {
        let cfg = StorageConfig::load(Some("/nonexistent/PageStore.toml")).unwrap();
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.pool_size, 64);
        assert_eq!(cfg.replacer_k, 2);
    }

    #[test]
    fn env_override_wins() {
        std::env::set_var("PAGESTORE_POOL_SIZE", "7");
        let cfg = StorageConfig::load(None).unwrap();
        assert_eq!(cfg.pool_size, 7);
        std::env::remove_var("PAGESTORE_POOL_SIZE");
    }
}
