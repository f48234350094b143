//! Shared status of a stream writer.
//!
//! The only state touched by more than one thread. Every field lives behind
//! a single mutex; each accessor takes the lock for the one read or update
//! it performs, so the lock is never held across I/O.

use parking_lot::Mutex;
use snapstream_core::{StreamError, StreamStatus};

#[derive(Debug)]
struct StatusFields {
    status: StreamStatus,
    end_of_sequence: bool,
    chunk_index: u64,
    chunk_size_bytes: u64,
    finished: bool,
}

/// Lock-guarded stream status.
#[derive(Debug)]
pub struct StatusCell {
    inner: Mutex<StatusFields>,
}

/// Consistent copy of every status field, taken under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Current status
    pub status: StreamStatus,
    /// Whether the cursor has reported end of sequence
    pub end_of_sequence: bool,
    /// Index of the chunk being written (= number of committed chunks)
    pub chunk_index: u64,
    /// Estimated bytes written to the current chunk
    pub chunk_size_bytes: u64,
    /// Whether the writer has stopped
    pub finished: bool,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    /// Fresh status: ok, chunk 0, nothing written
    pub fn new() -> Self {
        StatusCell {
            inner: Mutex::new(StatusFields {
                status: Ok(()),
                end_of_sequence: false,
                chunk_index: 0,
                chunk_size_bytes: 0,
                finished: false,
            }),
        }
    }

    /// Current status
    pub fn status(&self) -> StreamStatus {
        self.inner.lock().status.clone()
    }

    /// Record a terminal error unless the stream already has a terminal
    /// status: a prior error, or a writer that finished successfully.
    ///
    /// Returns `true` if this call set the status.
    pub fn record_error(&self, error: StreamError) -> bool {
        let mut fields = self.inner.lock();
        if fields.status.is_err() || fields.finished {
            return false;
        }
        fields.status = Err(error);
        true
    }

    /// Mark the writer as stopped; the status is final from here on
    pub fn mark_finished(&self) {
        self.inner.lock().finished = true;
    }

    /// Whether the writer has stopped
    pub fn is_finished(&self) -> bool {
        self.inner.lock().finished
    }

    /// Whether end of sequence has been reached
    pub fn end_of_sequence(&self) -> bool {
        self.inner.lock().end_of_sequence
    }

    /// Record what the cursor reported for the latest pull
    pub fn set_end_of_sequence(&self, end_of_sequence: bool) {
        self.inner.lock().end_of_sequence = end_of_sequence;
    }

    /// Index of the chunk currently open
    pub fn chunk_index(&self) -> u64 {
        self.inner.lock().chunk_index
    }

    /// Estimated bytes in the chunk currently open
    pub fn chunk_size_bytes(&self) -> u64 {
        self.inner.lock().chunk_size_bytes
    }

    /// Account for one element written to the open chunk
    pub fn add_chunk_bytes(&self, bytes: u64) {
        let mut fields = self.inner.lock();
        fields.chunk_size_bytes = fields.chunk_size_bytes.saturating_add(bytes);
    }

    /// Advance to the next chunk after a commit
    pub fn advance_chunk(&self) {
        let mut fields = self.inner.lock();
        fields.chunk_index += 1;
        fields.chunk_size_bytes = 0;
    }

    /// Outer-loop condition: more chunks to write
    pub fn should_write_chunk(&self) -> bool {
        let fields = self.inner.lock();
        !fields.end_of_sequence && fields.status.is_ok()
    }

    /// Fill-loop condition: room in the chunk and more elements to write
    pub fn should_write_record(&self, max_chunk_size_bytes: u64) -> bool {
        let fields = self.inner.lock();
        fields.chunk_size_bytes < max_chunk_size_bytes
            && !fields.end_of_sequence
            && fields.status.is_ok()
    }

    /// Copy all fields at once
    pub fn snapshot(&self) -> StatusSnapshot {
        let fields = self.inner.lock();
        StatusSnapshot {
            status: fields.status.clone(),
            end_of_sequence: fields.end_of_sequence,
            chunk_index: fields.chunk_index,
            chunk_size_bytes: fields.chunk_size_bytes,
            finished: fields.finished,
        }
    }
}
