//! Error types for snapshot stream writing
//!
//! Every failure of a stream writer is terminal. The first terminal
//! condition recorded becomes the stream's final status and is handed out to
//! every caller of `wait()` and `status()`, so [`StreamError`] is `Clone`:
//! I/O failures are captured as their [`io::ErrorKind`] plus message rather
//! than as the non-cloneable [`io::Error`].

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Final or current status of a stream. `Ok(())` means no terminal
/// condition has been recorded (yet).
pub type StreamStatus = std::result::Result<(), StreamError>;

/// Coarse classification of a [`StreamError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamErrorKind {
    /// Invalid configuration, or directory creation, chunk initialization
    /// or thread spawn failed
    Setup,
    /// The cursor failed to produce an element
    Read,
    /// Appending to or closing a chunk failed
    Write,
    /// Renaming a chunk into the committed directory failed
    Commit,
    /// The stream was cancelled
    Cancelled,
    /// The writer thread died unexpectedly
    Internal,
}

/// Terminal stream errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// Could not create a directory the stream writes into
    #[error("Failed to create directory {path}: {message}")]
    CreateDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error kind
        io_kind: io::ErrorKind,
        /// Underlying error message
        message: String,
    },

    /// Could not open a new chunk file
    #[error("Failed to initialize chunk {path}: {message}")]
    ChunkInit {
        /// Chunk file path
        path: PathBuf,
        /// Underlying I/O error kind
        io_kind: io::ErrorKind,
        /// Underlying error message
        message: String,
    },

    /// The writer was given an invalid configuration
    #[error("Invalid stream configuration: {0}")]
    InvalidConfig(String),

    /// Could not start the background writer thread
    #[error("Failed to spawn writer thread for stream {stream_id}: {message}")]
    Spawn {
        /// Stream identifier
        stream_id: u64,
        /// Underlying error message
        message: String,
    },

    /// The cursor failed
    #[error("Failed to read next element: {0}")]
    Read(#[from] CursorError),

    /// Appending an element to, or closing, a chunk failed
    #[error("Failed to write chunk {path}: {message}")]
    Write {
        /// Chunk file path
        path: PathBuf,
        /// Underlying I/O error kind
        io_kind: io::ErrorKind,
        /// Underlying error message
        message: String,
    },

    /// Renaming a chunk into the committed directory failed
    #[error("Failed to commit chunk {from} to {to}: {message}")]
    Commit {
        /// Uncommitted chunk path
        from: PathBuf,
        /// Committed chunk path
        to: PathBuf,
        /// Underlying I/O error kind
        io_kind: io::ErrorKind,
        /// Underlying error message
        message: String,
    },

    /// The stream was cancelled by its owner
    #[error("Stream {stream_id} was cancelled")]
    Cancelled {
        /// Stream identifier
        stream_id: u64,
    },

    /// The writer thread panicked
    #[error("Writer thread for stream {stream_id} panicked: {message}")]
    Panicked {
        /// Stream identifier
        stream_id: u64,
        /// Panic payload, if it was a string
        message: String,
    },
}

impl StreamError {
    /// Directory creation failure
    pub fn create_directory(path: &Path, err: &io::Error) -> Self {
        StreamError::CreateDirectory {
            path: path.to_path_buf(),
            io_kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Chunk initialization failure
    pub fn chunk_init(path: &Path, err: &io::Error) -> Self {
        StreamError::ChunkInit {
            path: path.to_path_buf(),
            io_kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Chunk append/close failure
    pub fn write(path: &Path, err: &io::Error) -> Self {
        StreamError::Write {
            path: path.to_path_buf(),
            io_kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Chunk rename failure
    pub fn commit(from: &Path, to: &Path, err: &io::Error) -> Self {
        StreamError::Commit {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            io_kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Cancellation of the given stream
    pub fn cancelled(stream_id: u64) -> Self {
        StreamError::Cancelled { stream_id }
    }

    /// Classify this error
    pub fn kind(&self) -> StreamErrorKind {
        match self {
            StreamError::CreateDirectory { .. }
            | StreamError::ChunkInit { .. }
            | StreamError::InvalidConfig(_)
            | StreamError::Spawn { .. } => StreamErrorKind::Setup,
            StreamError::Read(_) => StreamErrorKind::Read,
            StreamError::Write { .. } => StreamErrorKind::Write,
            StreamError::Commit { .. } => StreamErrorKind::Commit,
            StreamError::Cancelled { .. } => StreamErrorKind::Cancelled,
            StreamError::Panicked { .. } => StreamErrorKind::Internal,
        }
    }

    /// True if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        self.kind() == StreamErrorKind::Cancelled
    }

    /// The I/O error kind behind this error, if there is one
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StreamError::CreateDirectory { io_kind, .. }
            | StreamError::ChunkInit { io_kind, .. }
            | StreamError::Write { io_kind, .. }
            | StreamError::Commit { io_kind, .. } => Some(*io_kind),
            _ => None,
        }
    }
}

/// Errors produced by an element cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Reading the underlying data source failed
    #[error("Data source error: {0}")]
    Source(String),

    /// The source produced data that could not be turned into an element
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// The cursor was asked for more elements after end of sequence
    #[error("Cursor called after end of sequence")]
    Exhausted,
}

impl From<io::Error> for CursorError {
    fn from(e: io::Error) -> Self {
        CursorError::Source(e.to_string())
    }
}
