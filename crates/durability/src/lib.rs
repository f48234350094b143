//! Durability layer for snapstream
//!
//! This crate handles everything that touches disk:
//!
//! - Chunk record format: length-prefixed, CRC32-checked element records
//! - Chunk sinks and readers
//! - Snapshot stream writer: background chunk rotation with atomic commit
//! - Committed/uncommitted chunk discovery
//! - Testing cursors and fault-injecting sinks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk; // Chunk sinks, reader and listing
pub mod format; // Binary on-disk chunk record format
pub mod stream; // Stream writer lifecycle, rotation and commit
pub mod testing; // Test cursors and sinks

// === Re-exports ===
pub use chunk::{
    list_committed_chunks, list_uncommitted_chunks, ChunkReadError, ChunkReader, ChunkSink,
    ChunkSinkFactory, RecordChunkWriter, RecordSinkFactory,
};
pub use format::{decode_record, encode_record, ChunkRecordError, RECORD_OVERHEAD};
pub use stream::{
    commit_chunk, SnapshotStreamWriter, StatusCell, StatusSnapshot, StreamConfigError,
    StreamWriterConfig, DEFAULT_MAX_CHUNK_SIZE_BYTES,
};
