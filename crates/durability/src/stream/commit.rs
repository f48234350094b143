//! Chunk commit protocol.
//!
//! A chunk is written under the stream's uncommitted directory and becomes
//! visible to readers of the committed directory in a single `rename`:
//!
//! 1. The chunk sink is closed (flushed, and fsynced if configured)
//! 2. Atomic rename into the committed directory, same base name
//! 3. If configured, fsync the committed directory
//!
//! A reader of the committed directory therefore sees either the whole
//! chunk or no chunk. A failed rename leaves the chunk where it was.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use snapstream_core::StreamError;

/// Move a closed chunk into `committed_dir`, keeping its file name.
///
/// Returns the committed path. Failures are not retried.
pub fn commit_chunk(
    uncommitted_path: &Path,
    committed_dir: &Path,
    sync_dir: bool,
) -> Result<PathBuf, StreamError> {
    let file_name = uncommitted_path.file_name().ok_or_else(|| {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "chunk path has no file name");
        StreamError::commit(uncommitted_path, committed_dir, &err)
    })?;
    let committed_path = committed_dir.join(file_name);

    std::fs::rename(uncommitted_path, &committed_path)
        .map_err(|e| StreamError::commit(uncommitted_path, &committed_path, &e))?;

    if sync_dir {
        File::open(committed_dir)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| StreamError::commit(uncommitted_path, &committed_path, &e))?;
    }

    Ok(committed_path)
}
