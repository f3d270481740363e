//! Cardinality Index
//!
//! Persisted per-bucket record counts (`stat.txt`).
//!
//! The counts are a fast emptiness check, not a source of truth: every value
//! must equal the number of records in the bucket's file. The whole table is
//! rewritten atomically after each change.
//!
//! ## File Format
//! ```text
//! {
//!     "a": 2,
//!     "b": 0,
//!     ...
//!     "z": 0,
//!     "#": 1
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};
use crate::router::Bucket;
use crate::storage::AtomicFile;

/// In-memory copy of the index file
#[derive(Debug)]
pub struct CardinalityIndex {
    path: PathBuf,
    counts: [u64; Bucket::COUNT],
    sync: SyncStrategy,
}

impl CardinalityIndex {
    /// Name of the index file inside the data directory
    pub const FILENAME: &'static str = "stat.txt";

    /// Load the index from `path`, creating an all-zero index if absent
    pub fn load(path: &Path, sync: SyncStrategy) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let index = match contents {
            Some(contents) => Self {
                path: path.to_path_buf(),
                counts: parse_counts(path, &contents)?,
                sync,
            },
            None => {
                let index = Self {
                    path: path.to_path_buf(),
                    counts: [0; Bucket::COUNT],
                    sync,
                };
                index.persist()?;
                tracing::info!(path = %path.display(), "initialized empty index");
                index
            }
        };

        Ok(index)
    }

    /// Record count of a bucket
    pub fn get(&self, bucket: Bucket) -> u64 {
        self.counts[bucket.index()]
    }

    /// Set a bucket's count and persist the whole index
    ///
    /// On failure the in-memory value is left as it was.
    pub fn set(&mut self, bucket: Bucket, count: u64) -> Result<()> {
        let previous = std::mem::replace(&mut self.counts[bucket.index()], count);
        if let Err(e) = self.persist() {
            self.counts[bucket.index()] = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Sum of all bucket counts
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// All counts in index order
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, u64)> + '_ {
        Bucket::all().map(move |b| (b, self.counts[b.index()]))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let mut tmp = AtomicFile::create(&self.path, self.sync)?;
        {
            let mut out = BufWriter::new(tmp.file_mut());
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
            IndexFile(&self.counts).serialize(&mut serializer)?;
            out.flush()?;
        }
        tmp.commit()
    }
}

/// Serializes counts as a JSON object keyed by bucket symbol, in bucket order
struct IndexFile<'a>(&'a [u64; Bucket::COUNT]);

impl Serialize for IndexFile<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Bucket::COUNT))?;
        for bucket in Bucket::all() {
            map.serialize_entry(&bucket.symbol().to_string(), &self.0[bucket.index()])?;
        }
        map.end()
    }
}

fn parse_counts(path: &Path, contents: &str) -> Result<[u64; Bucket::COUNT]> {
    let raw: HashMap<String, u64> = serde_json::from_str(contents).map_err(|e| {
        StoreError::Index(format!("{}: {}", path.display(), e))
    })?;

    let mut counts = [0; Bucket::COUNT];
    let mut seen = [false; Bucket::COUNT];
    for (symbol, count) in raw {
        let bucket = single_char(&symbol)
            .and_then(Bucket::from_symbol)
            .ok_or_else(|| {
                StoreError::Index(format!("{}: unknown bucket {:?}", path.display(), symbol))
            })?;
        counts[bucket.index()] = count;
        seen[bucket.index()] = true;
    }

    if let Some(missing) = Bucket::all().find(|b| !seen[b.index()]) {
        return Err(StoreError::Index(format!(
            "{}: missing count for bucket {:?}",
            path.display(),
            missing.symbol()
        )));
    }

    Ok(counts)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
