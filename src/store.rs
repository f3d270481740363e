//! Store Module
//!
//! The façade that coordinates routing, the cardinality index and the bucket
//! files.
//!
//! ## Responsibilities
//! - Bootstrap the data directory on open
//! - Route every keyed operation to its bucket
//! - Skip file access for buckets the index reports as empty
//! - Keep the index in step with every insert and delete
//! - Full scans, recounts and index repair

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::index::CardinalityIndex;
use crate::record::{self, Record};
use crate::router::{route, Bucket};
use crate::snapshot::Snapshot;
use crate::storage::{remove_stray_temp_files, BucketStore};

/// A bucket whose indexed count differs from its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMismatch {
    pub bucket: Bucket,
    /// Count recorded in the index
    pub indexed: u64,
    /// Records actually present in the bucket file
    pub actual: u64,
}

/// The dictionary store
///
/// ## Concurrency Model
///
/// One process owns the data directory. Mutations take `&mut self`, so the
/// borrow checker rules out overlapping rewrites within the process; nothing
/// guards against a second process.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Bucket files
    buckets: BucketStore,

    /// Per-bucket record counts
    index: CardinalityIndex,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory and any missing bucket files
    /// 2. Remove temporary files left by an interrupted rewrite
    /// 3. Load the index, initializing it if absent
    /// 4. Optionally recount every bucket and repair the index
    pub fn open(config: Config) -> Result<Self> {
        let buckets = BucketStore::open(&config.data_dir, config.sync_strategy)?;

        let removed = remove_stray_temp_files(&config.data_dir)?;
        if removed > 0 {
            tracing::warn!(removed, "previous rewrite was interrupted");
        }

        let index_path = config.data_dir.join(CardinalityIndex::FILENAME);
        let index = CardinalityIndex::load(&index_path, config.sync_strategy)?;

        let mut store = Self {
            config,
            buckets,
            index,
        };

        if store.config.verify_on_open {
            store.reindex()?;
        }

        tracing::info!(
            data_dir = %store.config.data_dir.display(),
            records = store.len(),
            "store opened"
        );
        Ok(store)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Look up a record by key
    ///
    /// # Panics
    /// Panics if `key` is empty.
    pub fn get(&self, key: &str) -> Result<Option<Record>> {
        let bucket = route(key);
        if self.index.get(bucket) == 0 {
            return Ok(None);
        }
        self.buckets.get(bucket, key)
    }

    /// Insert or replace a record
    ///
    /// Returns `true` for a fresh insert, `false` for an update.
    ///
    /// # Panics
    /// Panics if the record key is empty.
    pub fn put(&mut self, record: &Record) -> Result<bool> {
        record::validate_key(&record.key)?;

        let bucket = route(&record.key);
        let count = self.index.get(bucket);

        let inserted = self.buckets.put(bucket, record, count == 0)?;
        if inserted {
            self.index.set(bucket, count + 1)?;
        }

        tracing::debug!(
            key = %record.key,
            bucket = %bucket,
            inserted,
            "put"
        );
        Ok(inserted)
    }

    /// Delete a record
    ///
    /// Returns `true` if the key existed.
    ///
    /// # Panics
    /// Panics if `key` is empty.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let bucket = route(key);
        let count = self.index.get(bucket);
        if count == 0 {
            return Ok(false);
        }

        let existed = self.buckets.delete(bucket, key)?;
        if existed {
            self.index.set(bucket, count - 1)?;
        }

        tracing::debug!(key, bucket = %bucket, existed, "delete");
        Ok(existed)
    }

    /// Load every record into an in-memory snapshot
    pub fn scan_all(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();
        for bucket in Bucket::all() {
            for record in self.buckets.scan(bucket)? {
                snapshot.insert(record);
            }
        }
        Ok(snapshot)
    }

    /// Recount every bucket file and report where the index disagrees
    ///
    /// Also fails on any malformed or out-of-order block.
    pub fn verify(&self) -> Result<Vec<CountMismatch>> {
        let mut mismatches = Vec::new();
        for (bucket, indexed) in self.index.iter() {
            let actual = self.buckets.count(bucket)?;
            if actual != indexed {
                mismatches.push(CountMismatch {
                    bucket,
                    indexed,
                    actual,
                });
            }
        }
        Ok(mismatches)
    }

    /// Recount every bucket file and persist corrected counts
    ///
    /// Returns the mismatches that were repaired.
    pub fn reindex(&mut self) -> Result<Vec<CountMismatch>> {
        let mismatches = self.verify()?;
        for m in &mismatches {
            tracing::warn!(
                bucket = %m.bucket,
                indexed = m.indexed,
                actual = m.actual,
                "repairing index count"
            );
            self.index.set(m.bucket, m.actual)?;
        }
        Ok(mismatches)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Indexed record count of one bucket
    pub fn count(&self, bucket: Bucket) -> u64 {
        self.index.get(bucket)
    }

    /// Indexed counts of all buckets, in bucket order
    pub fn counts(&self) -> impl Iterator<Item = (Bucket, u64)> + '_ {
        self.index.iter()
    }

    /// Total number of records
    pub fn len(&self) -> u64 {
        self.index.total()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Path of a bucket's file
    pub fn bucket_path(&self, bucket: Bucket) -> PathBuf {
        self.buckets.bucket_path(bucket)
    }

    /// Path of the index file
    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
