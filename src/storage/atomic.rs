//! Atomic file replacement
//!
//! New contents are written to a temporary file next to the target and renamed
//! over it once complete. A failure at any point before the rename drops the
//! temporary file and leaves the target untouched.

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::SyncStrategy;
use crate::error::{Result, StoreError};

const TEMP_PREFIX: char = '~';
const TEMP_SUFFIX: &str = ".tmp";

/// A pending replacement of `target`
pub(crate) struct AtomicFile {
    tmp: NamedTempFile,
    target: PathBuf,
    sync: SyncStrategy,
}

impl AtomicFile {
    /// Create `~<name>.XXXXXX.tmp` in the target's directory
    ///
    /// The temporary file takes the target's permissions, or the umask
    /// default when the target does not exist yet.
    pub(crate) fn create(target: &Path, sync: SyncStrategy) -> Result<Self> {
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = format!("{TEMP_PREFIX}{name}.");

        let existing = match fs::metadata(target) {
            Ok(meta) => Some(meta.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(TEMP_SUFFIX);
        if existing.is_none() {
            new_file_permissions(&mut builder);
        }
        let tmp = builder.tempfile_in(dir)?;

        // The rename replaces the target's mode with the temporary file's
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }

        Ok(Self {
            tmp,
            target: target.to_path_buf(),
            sync,
        })
    }

    /// Handle to write the new contents through
    pub(crate) fn file_mut(&mut self) -> &mut File {
        self.tmp.as_file_mut()
    }

    /// Close the temporary file and rename it over the target
    ///
    /// Callers must have flushed any buffered writer first.
    pub(crate) fn commit(self) -> Result<()> {
        if self.sync.should_sync() {
            self.tmp.as_file().sync_all()?;
        }

        // Closes the handle; the path is still removed on drop until persisted
        let temp_path = self.tmp.into_temp_path();
        temp_path
            .persist(&self.target)
            .map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

/// `tempfile` creates files as 0600; new targets get 0666 minus the umask,
/// like a plain `File::create`
#[cfg(unix)]
fn new_file_permissions(builder: &mut tempfile::Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;

    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn new_file_permissions(_builder: &mut tempfile::Builder<'_, '_>) {}

/// Delete temporary files left behind by an interrupted rewrite
///
/// Returns the number of files removed.
pub(crate) fn remove_stray_temp_files(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_temp_file(&path) {
            continue;
        }

        tracing::warn!(path = %path.display(), "removing stray temporary file");
        fs::remove_file(&path)?;
        removed += 1;
    }
    Ok(removed)
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .map_or(false, |n| n.starts_with(TEMP_PREFIX) && n.ends_with(TEMP_SUFFIX))
}
