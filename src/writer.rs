//! Crash-safe file replacement.
//!
//! Content goes to a temporary file in the target's directory, which is then
//! renamed over the target. Readers see either the old or the new bytes, never
//! a partial write, and a failed attempt leaves no temporary file behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

const TEMP_PREFIX: &str = ".mdtidy-";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create temporary file in {}: {source}", dir.display())]
    CreateTemp {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write temporary file: {0}")]
    WriteTemp(#[source] io::Error),

    #[error("failed to replace {}: {source}", path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Atomically replaces the contents of `path` with `content`.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), WriteError> {
    write_atomic_with(path, content, |temp, target| {
        temp.persist(target).map(|_| ()).map_err(|err| err.error)
    })
}

/// [`write_atomic`] with the final rename supplied by the caller.
///
/// The temporary file is owned by `persist`; dropping it on failure deletes it.
pub(crate) fn write_atomic_with<F>(path: &Path, content: &[u8], persist: F) -> Result<(), WriteError>
where
    F: FnOnce(NamedTempFile, &Path) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|source| WriteError::CreateTemp {
            dir: dir.to_path_buf(),
            source,
        })?;

    temp.write_all(content).map_err(WriteError::WriteTemp)?;
    temp.flush().map_err(WriteError::WriteTemp)?;

    // Temporary files are created owner-only; keep the target's mode instead
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.is_file() {
            fs::set_permissions(temp.path(), metadata.permissions()).map_err(WriteError::WriteTemp)?;
        }
    }

    log::trace!("renaming {} over {}", temp.path().display(), path.display());
    persist(temp, path).map_err(|source| WriteError::Rename {
        path: path.to_path_buf(),
        source,
    })
}
