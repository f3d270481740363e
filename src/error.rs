//! Error types for pnkc
//!
//! Provides a unified error type for all store operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::FormatError;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for pnkc operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Bucket File Errors
    // -------------------------------------------------------------------------
    /// A bucket file holds a block that cannot be decoded. The data directory
    /// was modified outside the store.
    #[error("Corrupted bucket file {path:?} at line {line}: {source}")]
    Corrupted {
        path: PathBuf,
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid key {0:?}: keys must not contain line breaks")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Index error: {0}")]
    Index(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
