//! Chunk reader.
//!
//! Streams the elements of a chunk written by
//! [`RecordChunkWriter`](super::RecordChunkWriter) back in write order.
//! Reading stops at the first bad record; nothing after a corrupt or
//! truncated record is trusted.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use snapstream_core::Element;

use crate::format::{decode_record, ChunkRecordError, RECORD_CRC_SIZE, RECORD_LENGTH_SIZE};

/// Chunk read errors
#[derive(Debug, thiserror::Error)]
pub enum ChunkReadError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A record failed its CRC check
    #[error("Corrupt record {record_index} in {path}: {source}")]
    Corrupt {
        /// Chunk file
        path: PathBuf,
        /// Zero-based record position
        record_index: u64,
        /// Decode failure
        #[source]
        source: ChunkRecordError,
    },

    /// The file ends in the middle of a record
    #[error("Truncated record {record_index} in {path}")]
    Truncated {
        /// Chunk file
        path: PathBuf,
        /// Zero-based record position
        record_index: u64,
    },
}

/// Sequential reader over the records of one chunk file.
pub struct ChunkReader {
    reader: BufReader<File>,
    path: PathBuf,
    records_read: u64,
    done: bool,
}

impl ChunkReader {
    /// Open a chunk file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChunkReadError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(ChunkReader {
            reader: BufReader::new(file),
            path,
            records_read: 0,
            done: false,
        })
    }

    /// Chunk file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next element; `Ok(None)` at a clean end of file
    pub fn read_next(&mut self) -> Result<Option<Element>, ChunkReadError> {
        if self.done {
            return Ok(None);
        }

        let mut len_bytes = [0u8; RECORD_LENGTH_SIZE];
        let got = read_fully(&mut self.reader, &mut len_bytes)?;
        if got == 0 {
            self.done = true;
            return Ok(None);
        }
        if got < RECORD_LENGTH_SIZE {
            return Err(self.truncated());
        }

        // The length header is untrusted: grow the buffer with the bytes
        // actually present instead of allocating what the header claims
        let body_len = u64::from(u32::from_le_bytes(len_bytes)) + RECORD_CRC_SIZE as u64;
        let mut record = len_bytes.to_vec();
        let got = (&mut self.reader).take(body_len).read_to_end(&mut record)?;
        if (got as u64) < body_len {
            return Err(self.truncated());
        }

        match decode_record(&record) {
            Ok((element, _)) => {
                self.records_read += 1;
                Ok(Some(element))
            }
            Err(source) => {
                self.done = true;
                Err(ChunkReadError::Corrupt {
                    path: self.path.clone(),
                    record_index: self.records_read,
                    source,
                })
            }
        }
    }

    /// Read every remaining element
    pub fn read_all(mut self) -> Result<Vec<Element>, ChunkReadError> {
        let mut elements = Vec::new();
        while let Some(element) = self.read_next()? {
            elements.push(element);
        }
        Ok(elements)
    }

    fn truncated(&mut self) -> ChunkReadError {
        self.done = true;
        ChunkReadError::Truncated {
            path: self.path.clone(),
            record_index: self.records_read,
        }
    }
}

impl Iterator for ChunkReader {
    type Item = Result<Element, ChunkReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read.
fn read_fully(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
