//! Storage Module
//!
//! Per-bucket sorted record logs, rewritten through a merge pass.
//!
//! ## Responsibilities
//! - Keep every bucket file sorted by key with no duplicates
//! - Insert, replace and remove records by streaming the old file into a
//!   temporary file and renaming it over the original
//! - Read records front-to-back for lookups and full scans
//!
//! ## File Layout
//! ```text
//! {data_dir}/
//! ├── a.pnkc                    ┌──────────────────────────┐
//! ├── ...                       │ WORD=apple               │
//! ├── z.pnkc                    │ MEANINGS=['a fruit']     │ record 1
//! ├── #.pnkc  (catch-all)       │ EXAMPLES=['I ate one.']  │
//! └── ~a.pnkc.XXXXXX.tmp        ├──────────────────────────┤
//!     (only mid-rewrite)        │ WORD=avocado             │ record 2
//!                               │ ...                      │
//!                               └──────────────────────────┘
//! ```

mod atomic;
mod bucket;
mod merge;
mod reader;

pub use bucket::BucketStore;
pub(crate) use atomic::remove_stray_temp_files;
pub(crate) use atomic::AtomicFile;
