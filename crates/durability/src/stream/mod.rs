//! Snapshot stream writing: configuration, shared status, the commit
//! protocol and the background writer.

pub mod commit;
pub mod config;
pub mod status;
pub mod writer;

pub use commit::commit_chunk;
pub use config::{StreamConfigError, StreamWriterConfig, DEFAULT_MAX_CHUNK_SIZE_BYTES};
pub use status::{StatusCell, StatusSnapshot};
pub use writer::SnapshotStreamWriter;
