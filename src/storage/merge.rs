//! Merge-rewrite
//!
//! Streams a sorted bucket file into a new one while inserting, replacing or
//! dropping a single record.
//!
//! ```text
//!              key < target: copy block
//!             ┌──────┐
//!             ▼      │
//!      ┌───────────────┐  key >= target   ┌──────────────┐
//!      │ BeforeTarget  │ ───────────────▶ │ AfterTarget  │ ── copy rest as raw bytes
//!      └───────────────┘  (apply action)  └──────────────┘
//!             │
//!             └── end of file: apply action as an append
//! ```

use std::cmp::Ordering;
use std::io::{self, BufRead, Write};

use crate::error::Result;

use super::reader::BlockReader;

/// What to do with the target key
#[derive(Debug, Clone, Copy)]
pub(crate) enum MergeAction<'a> {
    /// Insert or replace the record `key` with the encoded `block`
    Upsert { key: &'a str, block: &'a str },

    /// Remove the record `key` if present
    Remove { key: &'a str },
}

impl MergeAction<'_> {
    fn key(&self) -> &str {
        match self {
            MergeAction::Upsert { key, .. } | MergeAction::Remove { key } => key,
        }
    }
}

/// Result of a merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeOutcome {
    /// The key was new and has been written
    Inserted,
    /// The key existed and its block has been overwritten
    Replaced,
    /// The key existed and has been dropped
    Removed,
    /// The key did not exist; output equals input
    Absent,
}

enum Phase {
    BeforeTarget,
    AfterTarget,
}

/// Copy `source` into `out`, applying `action` at the target key's position
pub(crate) fn merge<R: BufRead, W: Write>(
    source: &mut BlockReader<R>,
    out: &mut W,
    action: MergeAction<'_>,
) -> Result<MergeOutcome> {
    let target = action.key();
    let mut phase = Phase::BeforeTarget;
    let mut outcome = MergeOutcome::Absent;

    loop {
        match phase {
            Phase::BeforeTarget => {
                let Some(block) = source.next_block()? else {
                    outcome = at_end(action, out)?;
                    break;
                };

                match block.key.as_str().cmp(target) {
                    Ordering::Less => out.write_all(block.text.as_bytes())?,
                    Ordering::Equal => {
                        outcome = at_target(action, out)?;
                        phase = Phase::AfterTarget;
                    }
                    Ordering::Greater => {
                        outcome = at_end(action, out)?;
                        out.write_all(block.text.as_bytes())?;
                        phase = Phase::AfterTarget;
                    }
                }
            }
            Phase::AfterTarget => {
                io::copy(source.get_mut(), out)?;
                break;
            }
        }
    }

    Ok(outcome)
}

/// The target key was found
fn at_target<W: Write>(action: MergeAction<'_>, out: &mut W) -> Result<MergeOutcome> {
    match action {
        MergeAction::Upsert { block, .. } => {
            out.write_all(block.as_bytes())?;
            Ok(MergeOutcome::Replaced)
        }
        MergeAction::Remove { .. } => Ok(MergeOutcome::Removed),
    }
}

/// The target key's slot was passed (greater key or end of file) without a match
fn at_end<W: Write>(action: MergeAction<'_>, out: &mut W) -> Result<MergeOutcome> {
    match action {
        MergeAction::Upsert { block, .. } => {
            out.write_all(block.as_bytes())?;
            Ok(MergeOutcome::Inserted)
        }
        MergeAction::Remove { .. } => Ok(MergeOutcome::Absent),
    }
}
