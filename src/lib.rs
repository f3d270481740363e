//! # pnkc
//!
//! A flat-file dictionary store with:
//! - 27 human-readable bucket files, one per initial letter plus a catch-all
//! - Sorted records, updated by merge-rewrite and atomic rename
//! - A persisted per-bucket cardinality index kept in step with the files
//! - In-memory snapshots for offline browsing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Front-end (CLI / CachedStore)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Store Façade                          │
//! │             get / put / delete / scan_all                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │   Router    │ │    Index    │ │   Bucket    │
//!   │ key → a..z# │ │ (stat.txt)  │ │   Store     │
//!   └─────────────┘ └─────────────┘ └──────┬──────┘
//!                                          │
//!                                          ▼
//!                                   ┌─────────────┐
//!                                   │   Record    │
//!                                   │   Codec     │
//!                                   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod router;
pub mod index;
pub mod storage;
pub mod store;
pub mod snapshot;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::{Config, SyncStrategy};
pub use record::Record;
pub use router::{route, Bucket};
pub use snapshot::{CachedStore, Snapshot};
pub use store::{CountMismatch, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pnkc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
