//! Core types for snapstream
//!
//! This crate defines the types shared by the writer and its collaborators:
//! - Element: the unit a cursor produces and a chunk stores
//! - ElementCursor: the source a stream writer drains
//! - StreamError / StreamStatus: terminal stream conditions
//! - SnapshotPaths: pure naming of snapshot, stream and chunk paths

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod element;
pub mod error;
pub mod paths;

pub use cursor::{ElementCursor, IterCursor};
pub use element::Element;
pub use error::{CursorError, StreamError, StreamErrorKind, StreamStatus};
pub use paths::{chunk_file_name, parse_chunk_file_name, SnapshotPaths, CHUNK_FILE_PREFIX};
