//! Chunk files: sinks that write them, a reader for them, and discovery of
//! committed chunks.

pub mod reader;
pub mod sink;

pub use reader::{ChunkReadError, ChunkReader};
pub use sink::{ChunkSink, ChunkSinkFactory, RecordChunkWriter, RecordSinkFactory};

use snapstream_core::{parse_chunk_file_name, SnapshotPaths};
use std::io;
use std::path::Path;

/// List committed chunk indices in ascending order.
///
/// A missing committed directory means nothing has been committed yet.
pub fn list_committed_chunks(paths: &SnapshotPaths) -> io::Result<Vec<u64>> {
    list_chunks_in(&paths.committed_chunks_dir())
}

/// List uncommitted chunk indices of one stream in ascending order.
///
/// These are chunks a terminated writer abandoned, or the chunk a running
/// writer is filling.
pub fn list_uncommitted_chunks(paths: &SnapshotPaths, stream_id: u64) -> io::Result<Vec<u64>> {
    list_chunks_in(&paths.uncommitted_chunks_dir(stream_id))
}

fn list_chunks_in(dir: &Path) -> io::Result<Vec<u64>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut chunks = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(index) = parse_chunk_file_name(&name) {
            chunks.push(index);
        }
    }

    chunks.sort_unstable();
    Ok(chunks)
}
