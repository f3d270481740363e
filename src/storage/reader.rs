//! Block Reader
//!
//! Sequential reader over the three-line blocks of a bucket file.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::record::{self, FormatError, Record, EXAMPLES_PREFIX, MEANINGS_PREFIX};

/// One undecoded record block
pub(crate) struct RawBlock {
    /// Key parsed from the `WORD=` line
    pub key: String,
    /// The three lines verbatim, line breaks included
    pub text: String,
    /// 1-based line number of the `WORD=` line
    pub line: usize,
}

/// Reads blocks in file order, checking structure and strict key order
pub(crate) struct BlockReader<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    previous: Option<String>,
}

impl<R: BufRead> BlockReader<R> {
    pub(crate) fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: 0,
            previous: None,
        }
    }

    /// Read the next block, or `None` at end of file
    ///
    /// Only the key is parsed; list literals stay undecoded until
    /// [`BlockReader::decode`] is called.
    pub(crate) fn next_block(&mut self) -> Result<Option<RawBlock>> {
        let mut text = String::new();
        if self.reader.read_line(&mut text)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        let start = self.line;
        let key_end = text.len();

        for expected in [MEANINGS_PREFIX, EXAMPLES_PREFIX] {
            let line_start = text.len();
            if self.reader.read_line(&mut text)? == 0 {
                return Err(self.corrupted(self.line + 1, FormatError::MissingLine { expected }));
            }
            self.line += 1;
            if !text[line_start..].starts_with(expected) {
                return Err(self.corrupted(self.line, FormatError::BadPrefix { expected }));
            }
            if !text.ends_with('\n') {
                return Err(self.corrupted(self.line, FormatError::Unterminated));
            }
        }

        let key = record::key_from_line(&text[..key_end])
            .map_err(|e| self.corrupted(start, e))?
            .to_string();

        if let Some(previous) = self.previous.take() {
            if key <= previous {
                return Err(self.corrupted(start, FormatError::OutOfOrder { key, previous }));
            }
        }
        self.previous = Some(key.clone());

        Ok(Some(RawBlock {
            key,
            text,
            line: start,
        }))
    }

    /// Fully decode a block read from this file
    pub(crate) fn decode(&self, block: &RawBlock) -> Result<Record> {
        record::decode_block(&block.text).map_err(|e| self.corrupted(block.line, e))
    }

    /// The underlying reader, positioned just after the last block read
    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    fn corrupted(&self, line: usize, source: FormatError) -> StoreError {
        StoreError::Corrupted {
            path: self.path.clone(),
            line,
            source,
        }
    }
}
