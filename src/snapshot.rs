//! Snapshot Module
//!
//! In-memory copies of the whole store for browsing and searching without
//! touching disk.
//!
//! ## Responsibilities
//! - Hold every record ordered by bucket, then by key
//! - Prefix search within a bucket
//! - [`CachedStore`]: keep a snapshot in step with writes made through it
//!
//! A snapshot is never authoritative; the bucket files are.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::config::Config;
use crate::error::Result;
use crate::record::Record;
use crate::router::{route, Bucket};
use crate::store::Store;

/// Every record of the store, keyed by bucket then key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    buckets: BTreeMap<Bucket, BTreeMap<String, Record>>,
}

impl Snapshot {
    /// An empty snapshot with all 27 buckets present
    pub fn new() -> Self {
        Self {
            buckets: Bucket::all().map(|b| (b, BTreeMap::new())).collect(),
        }
    }

    /// Read every bucket file of `store`
    pub fn load(store: &Store) -> Result<Self> {
        store.scan_all()
    }

    /// Look up a record by key
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.buckets.get(&route(key))?.get(key)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Records of one bucket, in key order
    pub fn bucket(&self, bucket: Bucket) -> &BTreeMap<String, Record> {
        &self.buckets[&bucket]
    }

    /// Insert or replace a record, returning the one it replaced
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let bucket = route(&record.key);
        self.buckets
            .entry(bucket)
            .or_default()
            .insert(record.key.clone(), record)
    }

    /// Remove a record by key
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.buckets.get_mut(&route(key))?.remove(key)
    }

    /// Records whose key starts with `prefix`, in key order
    ///
    /// An empty prefix yields every record.
    pub fn records_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> Box<dyn Iterator<Item = &'a Record> + 'a> {
        if prefix.is_empty() {
            return Box::new(self.iter());
        }

        let records = self.bucket(route(prefix));
        Box::new(
            records
                .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(move |(key, _)| key.starts_with(prefix))
                .map(|(_, record)| record),
        )
    }

    /// All records, bucket by bucket, each in key order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.buckets.values().flat_map(|records| records.values())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    /// Whether the snapshot holds no records
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(BTreeMap::is_empty)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Store`] paired with a snapshot that is updated on every write
///
/// Reads are served from memory. Writes go to disk first; the snapshot is
/// only touched after the store call succeeds.
pub struct CachedStore {
    store: Store,
    snapshot: Snapshot,
}

impl CachedStore {
    /// Open a store and load its snapshot
    pub fn open(config: Config) -> Result<Self> {
        Self::new(Store::open(config)?)
    }

    /// Wrap an open store, loading its snapshot
    pub fn new(store: Store) -> Result<Self> {
        let snapshot = store.scan_all()?;
        Ok(Self { store, snapshot })
    }

    /// Look up a record in the snapshot
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.snapshot.get(key)
    }

    /// Insert or replace a record on disk and in the snapshot
    pub fn put(&mut self, record: Record) -> Result<bool> {
        let inserted = self.store.put(&record)?;
        self.snapshot.insert(record);
        Ok(inserted)
    }

    /// Delete a record on disk and from the snapshot
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let existed = self.store.delete(key)?;
        self.snapshot.remove(key);
        Ok(existed)
    }

    /// Discard the snapshot and reload it from disk
    pub fn refresh(&mut self) -> Result<()> {
        self.snapshot = self.store.scan_all()?;
        Ok(())
    }

    /// The cached records
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Release the store, dropping the snapshot
    pub fn into_inner(self) -> Store {
        self.store
    }
}
