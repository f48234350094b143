//! snapstream - background snapshot stream writer
//!
//! A stream writer drains a dataset cursor on its own thread and persists
//! the elements as a sequence of size-bounded chunk files. Each chunk is
//! written under the stream's uncommitted directory and becomes visible in
//! the snapshot's committed directory through one atomic rename.
//!
//! # Quick Start
//!
//! ```ignore
//! use snapstream::{Element, IterCursor, SnapshotStreamWriter};
//!
//! let elements = (0..100u8).map(|i| Ok(Element::from_bytes(vec![i; 1024])));
//! let writer = SnapshotStreamWriter::new(
//!     IterCursor::new(elements),
//!     "/data/snapshots/run-1",
//!     0,               // stream id
//!     Some(64 * 1024), // max chunk size
//! )?;
//!
//! // From another thread: writer.cancel();
//! writer.wait()?;
//! ```
//!
//! # Architecture
//!
//! - `snapstream-core`: elements, cursors, errors and snapshot path naming
//! - `snapstream-durability`: chunk format, sinks, readers and the writer

pub use snapstream_core::*;
pub use snapstream_durability::{
    list_committed_chunks, list_uncommitted_chunks, ChunkReadError, ChunkReader, ChunkSink,
    ChunkSinkFactory, RecordChunkWriter, RecordSinkFactory, SnapshotStreamWriter,
    StatusSnapshot, StreamConfigError, StreamWriterConfig, DEFAULT_MAX_CHUNK_SIZE_BYTES,
};

/// Test cursors and fault-injecting sinks
pub mod testing {
    pub use snapstream_durability::testing::*;
}
