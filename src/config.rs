//! Configuration for pnkc
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── stat.txt         (cardinality index)
    ///     ├── a.pnkc ... z.pnkc
    ///     └── #.pnkc           (catch-all bucket)
    pub data_dir: PathBuf,

    /// Sync strategy: whether rewrites are fsynced before the rename
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Startup Configuration
    // -------------------------------------------------------------------------
    /// Recount every bucket on open and repair index drift
    pub verify_on_open: bool,
}

/// Sync strategy for rewritten bucket and index files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the temporary file before it replaces the original (safest)
    EveryWrite,

    /// Leave flushing to the OS page cache
    OsBuffered,
}

impl SyncStrategy {
    pub(crate) fn should_sync(self) -> bool {
        matches!(self, SyncStrategy::EveryWrite)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            sync_strategy: SyncStrategy::EveryWrite,
            verify_on_open: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Recount bucket files against the index when opening
    pub fn verify_on_open(mut self, verify: bool) -> Self {
        self.config.verify_on_open = verify;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
