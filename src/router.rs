//! Bucket Router
//!
//! Maps a key to one of 27 buckets: `a`..`z` by lower-cased first character,
//! plus the catch-all `#` for everything else.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of one of the 27 buckets
///
/// Ordered `a` < `b` < ... < `z` < `#`, the order buckets are listed in the
/// index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket(u8);

impl Bucket {
    /// Number of buckets
    pub const COUNT: usize = 27;

    /// Bucket for keys that do not start with a letter
    pub const CATCH_ALL: Bucket = Bucket(26);

    /// Symbol of the catch-all bucket
    pub const CATCH_ALL_SYMBOL: char = '#';

    /// All buckets in index order
    pub fn all() -> impl Iterator<Item = Bucket> {
        (0..Self::COUNT as u8).map(Bucket)
    }

    /// Look up a bucket by its symbol
    pub fn from_symbol(symbol: char) -> Option<Bucket> {
        match symbol {
            'a'..='z' => Some(Bucket(symbol as u8 - b'a')),
            Self::CATCH_ALL_SYMBOL => Some(Self::CATCH_ALL),
            _ => None,
        }
    }

    /// The symbol naming this bucket and its file
    pub fn symbol(self) -> char {
        if self == Self::CATCH_ALL {
            Self::CATCH_ALL_SYMBOL
        } else {
            (b'a' + self.0) as char
        }
    }

    /// Position in `0..Bucket::COUNT`
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A string that does not name a bucket
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bucket {0:?}: expected a single letter a-z or '#'")]
pub struct ParseBucketError(pub String);

impl FromStr for Bucket {
    type Err = ParseBucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Bucket::from_symbol(c.to_ascii_lowercase())
                .ok_or_else(|| ParseBucketError(s.to_string())),
            _ => Err(ParseBucketError(s.to_string())),
        }
    }
}

/// Route a key to its bucket
///
/// # Panics
/// Panics if `key` is empty.
pub fn route(key: &str) -> Bucket {
    assert!(!key.is_empty(), "routed key must not be empty");
    match key.chars().next().and_then(|c| c.to_lowercase().next()) {
        Some(c @ 'a'..='z') => Bucket(c as u8 - b'a'),
        _ => Bucket::CATCH_ALL,
    }
}
