//! Bucket Store
//!
//! Owns the 27 bucket files and performs every read and rewrite on them.
//!
//! ## Responsibilities
//! - Create missing bucket files on open
//! - Point lookups by front-to-back scan with early stop
//! - Insert/replace/delete via merge-rewrite and atomic rename
//! - Full-bucket decode for scans and recounts
//!
//! Record counts live in the [`CardinalityIndex`](crate::index::CardinalityIndex);
//! callers consult it before touching a file.

use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;
use crate::record::{self, Record};
use crate::router::Bucket;

use super::atomic::AtomicFile;
use super::merge::{merge, MergeAction, MergeOutcome};
use super::reader::BlockReader;

/// Reads and rewrites bucket files in one data directory
pub struct BucketStore {
    /// Directory holding the bucket files
    data_dir: PathBuf,

    /// Whether rewrites are fsynced before the rename
    sync: SyncStrategy,
}

impl BucketStore {
    /// File extension of bucket files
    pub const EXTENSION: &'static str = "pnkc";

    /// Open the bucket files in `data_dir`
    ///
    /// On startup:
    /// 1. Create the directory if it doesn't exist
    /// 2. Create an empty file for every bucket that has none
    pub fn open(data_dir: &Path, sync: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(data_dir)?;

        for bucket in Bucket::all() {
            let path = Self::bucket_path_with_dir(data_dir, bucket);
            if !path.exists() {
                OpenOptions::new().create(true).append(true).open(&path)?;
                tracing::debug!(bucket = %bucket, "created empty bucket file");
            }
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            sync,
        })
    }

    /// Look up a record by key
    ///
    /// Stops at the first key greater than `key`; bucket files are sorted.
    pub fn get(&self, bucket: Bucket, key: &str) -> Result<Option<Record>> {
        let mut reader = self.reader(bucket)?;

        while let Some(block) = reader.next_block()? {
            match block.key.as_str().cmp(key) {
                Ordering::Less => continue,
                Ordering::Equal => return reader.decode(&block).map(Some),
                Ordering::Greater => break,
            }
        }

        Ok(None)
    }

    /// Insert or replace a record
    ///
    /// `bucket_is_empty` must reflect the index: an empty bucket is written as
    /// the single record without reading the old file.
    ///
    /// Returns `true` if the key was new.
    pub fn put(&self, bucket: Bucket, record: &Record, bucket_is_empty: bool) -> Result<bool> {
        let block = record::encode(record)?;
        let path = self.bucket_path(bucket);

        let mut tmp = AtomicFile::create(&path, self.sync)?;

        if bucket_is_empty {
            tmp.file_mut().write_all(block.as_bytes())?;
            tmp.commit()?;
            return Ok(true);
        }

        let outcome = {
            let mut source = self.reader(bucket)?;
            let mut out = BufWriter::new(tmp.file_mut());
            let outcome = merge(
                &mut source,
                &mut out,
                MergeAction::Upsert {
                    key: &record.key,
                    block: &block,
                },
            )?;
            out.flush()?;
            outcome
        };
        tmp.commit()?;

        Ok(outcome == MergeOutcome::Inserted)
    }

    /// Remove a record
    ///
    /// Returns `true` if the key existed. When it did not, the bucket file is
    /// left untouched.
    pub fn delete(&self, bucket: Bucket, key: &str) -> Result<bool> {
        let path = self.bucket_path(bucket);
        let mut tmp = AtomicFile::create(&path, self.sync)?;

        let outcome = {
            let mut source = self.reader(bucket)?;
            let mut out = BufWriter::new(tmp.file_mut());
            let outcome = merge(&mut source, &mut out, MergeAction::Remove { key })?;
            out.flush()?;
            outcome
        };

        if outcome != MergeOutcome::Removed {
            // Dropping `tmp` deletes the temporary file
            return Ok(false);
        }
        tmp.commit()?;
        Ok(true)
    }

    /// Decode every record of a bucket, in key order
    pub fn scan(&self, bucket: Bucket) -> Result<Vec<Record>> {
        let mut reader = self.reader(bucket)?;
        let mut records = Vec::new();
        while let Some(block) = reader.next_block()? {
            records.push(reader.decode(&block)?);
        }
        Ok(records)
    }

    /// Count the well-formed records of a bucket by reading the whole file
    pub fn count(&self, bucket: Bucket) -> Result<u64> {
        let mut reader = self.reader(bucket)?;
        let mut count = 0;
        while let Some(block) = reader.next_block()? {
            reader.decode(&block)?;
            count += 1;
        }
        Ok(count)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a bucket's file
    pub fn bucket_path(&self, bucket: Bucket) -> PathBuf {
        Self::bucket_path_with_dir(&self.data_dir, bucket)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "a" → "{dir}/a.pnkc", catch-all → "{dir}/#.pnkc"
    fn bucket_path_with_dir(dir: &Path, bucket: Bucket) -> PathBuf {
        dir.join(format!("{}.{}", bucket.symbol(), Self::EXTENSION))
    }

    fn reader(&self, bucket: Bucket) -> Result<BlockReader<BufReader<File>>> {
        let path = self.bucket_path(bucket);
        let file = File::open(&path)?;
        Ok(BlockReader::new(BufReader::new(file), &path))
    }
}
