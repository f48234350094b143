//! Chunk sinks.
//!
//! A sink is the append-only writer behind one open chunk file. The stream
//! writer opens one per chunk through a [`ChunkSinkFactory`], appends
//! elements to it and closes it before the chunk is committed.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use snapstream_core::Element;
use tracing::warn;

use crate::format::encode_record;

/// Append-only writer for a single chunk file.
pub trait ChunkSink: Send {
    /// Append one element
    fn append(&mut self, element: &Element) -> io::Result<()>;

    /// Flush and close the chunk.
    ///
    /// Calling `close` again after it succeeded is a no-op.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens chunk sinks.
pub trait ChunkSinkFactory: Send {
    /// Create a new chunk at `path` and return a sink for it
    fn create(&self, path: &Path) -> io::Result<Box<dyn ChunkSink>>;
}

/// Sink writing framed records (see [`crate::format::chunk_record`]) to a file.
pub struct RecordChunkWriter {
    /// Buffered file handle, `None` once closed
    writer: Option<BufWriter<File>>,

    /// Chunk file path
    path: PathBuf,

    /// fsync the file on close
    sync_on_close: bool,

    /// Records appended
    records_written: u64,

    /// Bytes appended, including framing
    bytes_written: u64,
}

impl RecordChunkWriter {
    /// Create a new chunk file.
    ///
    /// Fails if the file already exists: a chunk is never reopened.
    pub fn create(path: impl AsRef<Path>, sync_on_close: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)?;

        Ok(RecordChunkWriter {
            writer: Some(BufWriter::new(file)),
            path,
            sync_on_close,
            records_written: 0,
            bytes_written: 0,
        })
    }

    /// Chunk file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of bytes appended so far, including framing
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// True once the chunk has been closed
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl ChunkSink for RecordChunkWriter {
    fn append(&mut self, element: &Element) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("chunk {} is already closed", self.path.display()),
            )
        })?;

        let record = encode_record(element)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        writer.write_all(&record)?;

        self.records_written += 1;
        self.bytes_written += record.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        writer.flush()?;
        if self.sync_on_close {
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}

impl Drop for RecordChunkWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to close chunk on drop");
        }
    }
}

/// Factory for [`RecordChunkWriter`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordSinkFactory {
    sync_on_close: bool,
}

impl RecordSinkFactory {
    /// Create a factory; `sync_on_close` fsyncs every chunk when it is closed
    pub fn new(sync_on_close: bool) -> Self {
        RecordSinkFactory { sync_on_close }
    }
}

impl ChunkSinkFactory for RecordSinkFactory {
    fn create(&self, path: &Path) -> io::Result<Box<dyn ChunkSink>> {
        let writer = RecordChunkWriter::create(path, self.sync_on_close)?;
        Ok(Box::new(writer))
    }
}
