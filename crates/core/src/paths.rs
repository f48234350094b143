//! Snapshot directory structure
//!
//! A snapshot is a directory shared by all of its streams. The layout is:
//!
//! ```text
//! snapshot/
//! ├── streams/
//! │   ├── 0/
//! │   │   └── uncommitted_chunks/   # chunks being written by stream 0
//! │   │       └── chunk_3
//! │   └── 1/
//! │       └── uncommitted_chunks/
//! └── committed_chunks/             # chunks from every stream, fully written
//!     ├── chunk_0
//!     └── ...
//! ```
//!
//! All functions here are pure; nothing touches the filesystem.

use std::path::{Path, PathBuf};

/// Prefix of every chunk file name
pub const CHUNK_FILE_PREFIX: &str = "chunk_";

const STREAMS_DIR: &str = "streams";
const UNCOMMITTED_CHUNKS_DIR: &str = "uncommitted_chunks";
const COMMITTED_CHUNKS_DIR: &str = "committed_chunks";

/// Snapshot directory paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    /// Root snapshot directory
    root: PathBuf,
}

impl SnapshotPaths {
    /// Create paths from the snapshot root directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        SnapshotPaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root snapshot directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one subdirectory per stream
    pub fn streams_dir(&self) -> PathBuf {
        self.root.join(STREAMS_DIR)
    }

    /// Directory of a single stream
    pub fn stream_dir(&self, stream_id: u64) -> PathBuf {
        self.streams_dir().join(stream_id.to_string())
    }

    /// Directory where a stream writes chunks that are not committed yet
    pub fn uncommitted_chunks_dir(&self, stream_id: u64) -> PathBuf {
        self.stream_dir(stream_id).join(UNCOMMITTED_CHUNKS_DIR)
    }

    /// Directory of committed chunks, shared by all streams
    pub fn committed_chunks_dir(&self) -> PathBuf {
        self.root.join(COMMITTED_CHUNKS_DIR)
    }

    /// Path of an uncommitted chunk
    pub fn uncommitted_chunk_path(&self, stream_id: u64, chunk_index: u64) -> PathBuf {
        self.uncommitted_chunks_dir(stream_id)
            .join(chunk_file_name(chunk_index))
    }

    /// Path of a committed chunk
    pub fn committed_chunk_path(&self, chunk_index: u64) -> PathBuf {
        self.committed_chunks_dir().join(chunk_file_name(chunk_index))
    }
}

/// File name of a chunk: `chunk_<index>`
pub fn chunk_file_name(chunk_index: u64) -> String {
    format!("{}{}", CHUNK_FILE_PREFIX, chunk_index)
}

/// Parse a chunk index out of a file name.
///
/// Returns `None` for anything that is not exactly `chunk_<decimal>`.
pub fn parse_chunk_file_name(name: &str) -> Option<u64> {
    let digits = name.strip_prefix(CHUNK_FILE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_root() {
        let paths = SnapshotPaths::from_root("/tmp/snap");

        assert_eq!(paths.root(), Path::new("/tmp/snap"));
        assert_eq!(paths.streams_dir(), PathBuf::from("/tmp/snap/streams"));
        assert_eq!(paths.stream_dir(4), PathBuf::from("/tmp/snap/streams/4"));
        assert_eq!(
            paths.uncommitted_chunks_dir(4),
            PathBuf::from("/tmp/snap/streams/4/uncommitted_chunks")
        );
        assert_eq!(
            paths.committed_chunks_dir(),
            PathBuf::from("/tmp/snap/committed_chunks")
        );
    }

    #[test]
    fn test_chunk_paths() {
        let paths = SnapshotPaths::from_root("/tmp/snap");

        assert_eq!(
            paths.uncommitted_chunk_path(2, 0),
            PathBuf::from("/tmp/snap/streams/2/uncommitted_chunks/chunk_0")
        );
        assert_eq!(
            paths.committed_chunk_path(17),
            PathBuf::from("/tmp/snap/committed_chunks/chunk_17")
        );
    }

    #[test]
    fn test_commit_preserves_base_name() {
        let paths = SnapshotPaths::from_root("/tmp/snap");
        let uncommitted = paths.uncommitted_chunk_path(9, 5);
        let committed = paths.committed_chunk_path(5);
        assert_eq!(uncommitted.file_name(), committed.file_name());
    }

    #[test]
    fn test_parse_chunk_file_name() {
        assert_eq!(parse_chunk_file_name("chunk_0"), Some(0));
        assert_eq!(parse_chunk_file_name("chunk_123"), Some(123));
        assert_eq!(parse_chunk_file_name(&chunk_file_name(42)), Some(42));

        assert_eq!(parse_chunk_file_name("chunk_"), None);
        assert_eq!(parse_chunk_file_name("chunk_-1"), None);
        assert_eq!(parse_chunk_file_name("chunk_1.tmp"), None);
        assert_eq!(parse_chunk_file_name("wal-000001.seg"), None);
    }

    proptest::proptest! {
        #[test]
        fn prop_chunk_names_parse_back(index in proptest::prelude::any::<u64>()) {
            proptest::prop_assert_eq!(parse_chunk_file_name(&chunk_file_name(index)), Some(index));
        }

        #[test]
        fn prop_parse_never_panics(name in "\\PC*") {
            let _ = parse_chunk_file_name(&name);
        }
    }
}
