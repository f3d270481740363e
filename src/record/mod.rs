//! Record Module
//!
//! The dictionary entry stored by the engine and its textual encoding.
//!
//! ## Block Format
//! Every record occupies exactly three lines of a bucket file:
//! ```text
//! WORD=<key>
//! MEANINGS=<list literal>
//! EXAMPLES=<list literal>
//! ```
//! The list literal uses Python `repr` syntax (`['gloss one', "it's"]`) so
//! bucket files remain interchangeable with the original tool.

mod codec;
mod literal;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codec::{
    decode, decode_block, encode, key_from_line, validate_key, EXAMPLES_PREFIX, KEY_PREFIX,
    MEANINGS_PREFIX,
};
pub use literal::{decode_list, encode_list};

/// A dictionary entry: a key plus ordered meanings and examples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, non-empty identifier within the whole store
    pub key: String,

    /// Glosses in display order (duplicates allowed)
    pub meanings: Vec<String>,

    /// Example sentences in display order (duplicates allowed)
    pub examples: Vec<String>,
}

impl Record {
    /// Create a new record
    ///
    /// # Panics
    /// Panics if `key` is empty.
    pub fn new(key: impl Into<String>, meanings: Vec<String>, examples: Vec<String>) -> Self {
        let key = key.into();
        assert!(!key.is_empty(), "record key must not be empty");
        Self {
            key,
            meanings,
            examples,
        }
    }
}

/// A line (or group of lines) that does not follow the block format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("missing {expected} line")]
    MissingLine { expected: &'static str },

    #[error("line does not start with {expected:?}")]
    BadPrefix { expected: &'static str },

    #[error("line is not terminated by a line break")]
    Unterminated,

    #[error("record key is empty")]
    EmptyKey,

    #[error("invalid list literal at byte {offset}: {reason}")]
    Literal { offset: usize, reason: String },

    #[error("key {key:?} does not sort after preceding key {previous:?}")]
    OutOfOrder { key: String, previous: String },
}
