//! Fault-injecting chunk sinks

use std::io;
use std::path::Path;

use snapstream_core::{parse_chunk_file_name, Element};

use crate::chunk::{ChunkSink, ChunkSinkFactory, RecordChunkWriter};

/// Which sink operation to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFailure {
    /// Refuse to create the chunk with this index
    Create {
        /// Chunk index to refuse
        chunk_index: u64,
    },
    /// Fail every append once this many records are in a chunk
    Append {
        /// Records accepted per chunk before failing
        after_records: u64,
    },
    /// Fail every explicit close
    Close,
}

/// Sink factory producing real record chunks that fail on demand.
#[derive(Debug, Clone)]
pub struct FailingSinkFactory {
    failure: SinkFailure,
}

impl FailingSinkFactory {
    /// Factory injecting `failure`
    pub fn new(failure: SinkFailure) -> Self {
        FailingSinkFactory { failure }
    }
}

impl ChunkSinkFactory for FailingSinkFactory {
    fn create(&self, path: &Path) -> io::Result<Box<dyn ChunkSink>> {
        if let SinkFailure::Create { chunk_index } = self.failure {
            let name = path.file_name().map(|n| n.to_string_lossy().to_string());
            if name.as_deref().and_then(parse_chunk_file_name) == Some(chunk_index) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("injected create failure for chunk {}", chunk_index),
                ));
            }
        }

        Ok(Box::new(FailingSink {
            inner: RecordChunkWriter::create(path, false)?,
            failure: self.failure,
        }))
    }
}

struct FailingSink {
    inner: RecordChunkWriter,
    failure: SinkFailure,
}

impl ChunkSink for FailingSink {
    fn append(&mut self, element: &Element) -> io::Result<()> {
        if let SinkFailure::Append { after_records } = self.failure {
            if self.inner.records_written() >= after_records {
                return Err(io::Error::new(io::ErrorKind::Other, "injected append failure"));
            }
        }
        self.inner.append(element)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.failure == SinkFailure::Close {
            return Err(io::Error::new(io::ErrorKind::Other, "injected close failure"));
        }
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_failure_only_for_chosen_chunk() {
        let temp_dir = TempDir::new().unwrap();
        let factory = FailingSinkFactory::new(SinkFailure::Create { chunk_index: 1 });

        assert!(factory.create(&temp_dir.path().join("chunk_0")).is_ok());
        assert!(factory.create(&temp_dir.path().join("chunk_1")).is_err());
        assert!(!temp_dir.path().join("chunk_1").exists());
    }

    #[test]
    fn test_append_failure_after_records() {
        let temp_dir = TempDir::new().unwrap();
        let factory = FailingSinkFactory::new(SinkFailure::Append { after_records: 1 });
        let mut sink = factory.create(&temp_dir.path().join("chunk_0")).unwrap();

        sink.append(&Element::from_bytes(vec![1])).unwrap();
        assert!(sink.append(&Element::from_bytes(vec![2])).is_err());
        sink.close().unwrap();
    }
}
