//! Record block codec
//!
//! Converts a [`Record`] to and from its three-line block.

use crate::error::{Result, StoreError};

use super::literal::{decode_list, encode_list};
use super::{FormatError, Record};

/// Prefix of the key line
pub const KEY_PREFIX: &str = "WORD=";

/// Prefix of the meanings line
pub const MEANINGS_PREFIX: &str = "MEANINGS=";

/// Prefix of the examples line
pub const EXAMPLES_PREFIX: &str = "EXAMPLES=";

/// Check that a key can be stored in a `WORD=` line
///
/// # Panics
/// Panics if `key` is empty.
pub fn validate_key(key: &str) -> Result<()> {
    assert!(!key.is_empty(), "record key must not be empty");
    if key.contains(['\n', '\r']) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Encode a record as three `\n`-terminated lines
pub fn encode(record: &Record) -> Result<String> {
    validate_key(&record.key)?;

    let meanings = encode_list(&record.meanings);
    let examples = encode_list(&record.examples);

    let mut block = String::with_capacity(
        KEY_PREFIX.len()
            + record.key.len()
            + MEANINGS_PREFIX.len()
            + meanings.len()
            + EXAMPLES_PREFIX.len()
            + examples.len()
            + 3,
    );
    block.push_str(KEY_PREFIX);
    block.push_str(&record.key);
    block.push('\n');
    block.push_str(MEANINGS_PREFIX);
    block.push_str(&meanings);
    block.push('\n');
    block.push_str(EXAMPLES_PREFIX);
    block.push_str(&examples);
    block.push('\n');
    Ok(block)
}

/// Decode a record from its three lines, each including its line break
///
/// Lines ending in `\r\n` are accepted; the `\r` is not part of the payload.
pub fn decode(lines: [&str; 3]) -> std::result::Result<Record, FormatError> {
    let [key_line, meanings_line, examples_line] = lines;

    let key = key_from_line(key_line)?;
    let meanings = decode_list(payload(meanings_line, MEANINGS_PREFIX)?)?;
    let examples = decode_list(payload(examples_line, EXAMPLES_PREFIX)?)?;

    Ok(Record {
        key: key.to_string(),
        meanings,
        examples,
    })
}

/// Decode a record from a complete block as produced by [`encode`]
pub fn decode_block(block: &str) -> std::result::Result<Record, FormatError> {
    let mut lines = block.split_inclusive('\n');
    let key_line = lines.next().ok_or(FormatError::MissingLine { expected: KEY_PREFIX })?;
    let meanings_line = lines.next().ok_or(FormatError::MissingLine {
        expected: MEANINGS_PREFIX,
    })?;
    let examples_line = lines.next().ok_or(FormatError::MissingLine {
        expected: EXAMPLES_PREFIX,
    })?;
    if lines.next().is_some() {
        return Err(FormatError::BadPrefix { expected: KEY_PREFIX });
    }
    decode([key_line, meanings_line, examples_line])
}

/// Extract the key from a `WORD=` line without decoding the rest of the block
pub fn key_from_line(line: &str) -> std::result::Result<&str, FormatError> {
    let key = payload(line, KEY_PREFIX)?;
    if key.is_empty() {
        return Err(FormatError::EmptyKey);
    }
    Ok(key)
}

/// Strip the prefix and the trailing line break (`\n` or `\r\n`)
fn payload<'a>(line: &'a str, prefix: &'static str) -> std::result::Result<&'a str, FormatError> {
    let body = line
        .strip_prefix(prefix)
        .ok_or(FormatError::BadPrefix { expected: prefix })?
        .strip_suffix('\n')
        .ok_or(FormatError::Unterminated)?;
    Ok(body.strip_suffix('\r').unwrap_or(body))
}
