//! Snapshot stream writer.
//!
//! Drains an [`ElementCursor`] into a sequence of chunk files on a
//! dedicated background thread. Each chunk is filled in the stream's
//! uncommitted directory and then committed with an atomic rename (see
//! [`commit`](super::commit)).
//!
//! # Rotation
//!
//! The chunk size cap is soft: it is checked before each element is pulled,
//! so a chunk ends up at most one element over the cap and no element is
//! ever split across chunks.
//!
//! # Cancellation
//!
//! [`SnapshotStreamWriter::cancel`] only records a cancelled status. The
//! writer thread checks the status between records and between chunks, so
//! it stops after the record or commit in flight. The chunk open at that
//! point still holds elements already pulled from the cursor, so it is
//! closed and committed before the writer stops.
//!
//! # Limitations
//!
//! There are no checkpoints. Chunks abandoned in the uncommitted directory
//! by a failed writer are not cleaned up or resumed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use snapstream_core::{Element, ElementCursor, SnapshotPaths, StreamError, StreamStatus};
use tracing::{debug, error, info, warn};

use super::commit::commit_chunk;
use super::config::StreamWriterConfig;
use super::status::{StatusCell, StatusSnapshot};
use crate::chunk::{ChunkSink, ChunkSinkFactory, RecordSinkFactory};

/// Writes one stream of a snapshot on a background thread.
///
/// The thread starts in the constructor and runs until the cursor is
/// drained, an error occurs, or the writer is cancelled. A finished writer
/// cannot be restarted.
pub struct SnapshotStreamWriter {
    stream_id: u64,
    paths: SnapshotPaths,
    status: Arc<StatusCell>,
    /// Taken by the first `wait`; held while joining so concurrent waiters
    /// block until the thread is gone.
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl SnapshotStreamWriter {
    /// Start writing `cursor` as stream `stream_id` of the snapshot at
    /// `snapshot_path`.
    ///
    /// `max_chunk_size_bytes` defaults to 10GiB when `None`.
    pub fn new<C>(
        cursor: C,
        snapshot_path: impl AsRef<Path>,
        stream_id: u64,
        max_chunk_size_bytes: Option<u64>,
    ) -> Result<Self, StreamError>
    where
        C: ElementCursor + 'static,
    {
        let config =
            StreamWriterConfig::new().with_optional_max_chunk_size_bytes(max_chunk_size_bytes);
        Self::with_config(cursor, snapshot_path, stream_id, config)
    }

    /// Start a writer with an explicit configuration
    pub fn with_config<C>(
        cursor: C,
        snapshot_path: impl AsRef<Path>,
        stream_id: u64,
        config: StreamWriterConfig,
    ) -> Result<Self, StreamError>
    where
        C: ElementCursor + 'static,
    {
        let sinks = RecordSinkFactory::new(config.sync_on_commit);
        Self::with_sink_factory(cursor, sinks, snapshot_path, stream_id, config)
    }

    /// Start a writer that opens chunks through `sinks`
    pub fn with_sink_factory<C, F>(
        cursor: C,
        sinks: F,
        snapshot_path: impl AsRef<Path>,
        stream_id: u64,
        config: StreamWriterConfig,
    ) -> Result<Self, StreamError>
    where
        C: ElementCursor + 'static,
        F: ChunkSinkFactory + 'static,
    {
        config
            .validate()
            .map_err(|e| StreamError::InvalidConfig(e.to_string()))?;

        let paths = SnapshotPaths::from_root(snapshot_path);
        let status = Arc::new(StatusCell::new());
        let driver = ChunkDriver {
            stream_id,
            paths: paths.clone(),
            config,
            cursor,
            sinks,
            status: Arc::clone(&status),
        };

        let handle = std::thread::Builder::new()
            .name(format!("snapstream-writer-{}", stream_id))
            .spawn(move || driver.run())
            .map_err(|e| StreamError::Spawn {
                stream_id,
                message: e.to_string(),
            })?;

        Ok(SnapshotStreamWriter {
            stream_id,
            paths,
            status,
            thread: Mutex::new(Some(handle)),
        })
    }

    /// Block until the writer thread has finished and return the final status.
    ///
    /// Safe to call repeatedly and from several threads; every call returns
    /// the same final status.
    pub fn wait(&self) -> StreamStatus {
        let mut thread = self.thread.lock();
        if let Some(handle) = thread.take() {
            if let Err(payload) = handle.join() {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "(non-string panic)".to_string());
                error!(
                    target: "snapstream::writer",
                    stream_id = self.stream_id,
                    panic = %message,
                    "Snapshot stream writer thread panicked"
                );
                self.status.record_error(StreamError::Panicked {
                    stream_id: self.stream_id,
                    message,
                });
                self.status.mark_finished();
            }
        }
        drop(thread);
        self.status.status()
    }

    /// Ask the writer to stop.
    ///
    /// Records a cancelled status unless the stream already has a terminal
    /// status. Returns immediately; use [`wait`](Self::wait) to join.
    pub fn cancel(&self) {
        if self.status.record_error(StreamError::cancelled(self.stream_id)) {
            info!(
                target: "snapstream::writer",
                stream_id = self.stream_id,
                "Snapshot stream writer cancelled"
            );
        }
    }

    /// Current status without blocking
    pub fn status(&self) -> StreamStatus {
        self.status.status()
    }

    /// Index of the chunk being written; equals the number of chunks
    /// committed so far
    pub fn chunk_index(&self) -> u64 {
        self.status.chunk_index()
    }

    /// Estimated bytes written to the current chunk
    pub fn chunk_size_bytes(&self) -> u64 {
        self.status.chunk_size_bytes()
    }

    /// Whether the cursor has reported end of sequence
    pub fn end_of_sequence(&self) -> bool {
        self.status.end_of_sequence()
    }

    /// Whether the writer thread has stopped writing
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Consistent view of all status fields
    pub fn progress(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// Stream identifier
    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    /// Snapshot directory layout this writer writes into
    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }
}

impl Drop for SnapshotStreamWriter {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.get_mut().take() {
            if !handle.is_finished() {
                self.cancel();
            }
            if handle.join().is_err() {
                warn!(
                    target: "snapstream::writer",
                    stream_id = self.stream_id,
                    "Snapshot stream writer thread panicked before drop"
                );
            }
        }
    }
}

/// Background routine: owns the cursor and the sinks.
struct ChunkDriver<C, F> {
    stream_id: u64,
    paths: SnapshotPaths,
    config: StreamWriterConfig,
    cursor: C,
    sinks: F,
    status: Arc<StatusCell>,
}

impl<C, F> ChunkDriver<C, F>
where
    C: ElementCursor,
    F: ChunkSinkFactory,
{
    fn run(mut self) {
        info!(
            target: "snapstream::writer",
            stream_id = self.stream_id,
            snapshot = %self.paths.root().display(),
            max_chunk_size_bytes = self.config.max_chunk_size_bytes,
            "Snapshot stream writer started"
        );

        if let Err(e) = self.write_snapshot() {
            if self.status.record_error(e.clone()) {
                warn!(
                    target: "snapstream::writer",
                    stream_id = self.stream_id,
                    error = %e,
                    "Snapshot stream writer failed"
                );
            }
        }
        self.status.mark_finished();

        let progress = self.status.snapshot();
        info!(
            target: "snapstream::writer",
            stream_id = self.stream_id,
            chunks_committed = progress.chunk_index,
            ok = progress.status.is_ok(),
            "Snapshot stream writer finished"
        );
    }

    fn write_snapshot(&mut self) -> StreamStatus {
        self.create_chunks_directories()?;
        while self.status.should_write_chunk() {
            self.write_chunk()?;
        }
        self.status.status()
    }

    fn create_chunks_directories(&self) -> StreamStatus {
        for dir in [
            self.paths.uncommitted_chunks_dir(self.stream_id),
            self.paths.committed_chunks_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| StreamError::create_directory(&dir, &e))?;
        }
        Ok(())
    }

    fn write_chunk(&mut self) -> StreamStatus {
        let chunk_index = self.status.chunk_index();
        let chunk_path = self
            .paths
            .uncommitted_chunk_path(self.stream_id, chunk_index);
        debug!(
            target: "snapstream::writer",
            stream_id = self.stream_id,
            chunk_index,
            path = %chunk_path.display(),
            "Opening chunk"
        );

        let sink = self
            .sinks
            .create(&chunk_path)
            .map_err(|e| StreamError::chunk_init(&chunk_path, &e))?;
        let mut sink = SinkGuard::new(sink, chunk_path);

        // Also stops on cancellation; the chunk is committed either way and
        // the outer loop sees the cancelled status
        while self.status.should_write_record(self.config.max_chunk_size_bytes) {
            self.write_record(&mut sink)?;
        }

        sink.close()?;
        self.commit(sink.path(), chunk_index)
    }

    fn write_record(&mut self, sink: &mut SinkGuard) -> StreamStatus {
        let next = self.cursor.next_element()?;
        self.status.set_end_of_sequence(next.is_none());

        let Some(element) = next else {
            return sink.close();
        };

        sink.append(&element)?;
        self.status.add_chunk_bytes(element.estimated_size_bytes());
        Ok(())
    }

    fn commit(&self, chunk_path: &Path, chunk_index: u64) -> StreamStatus {
        let chunk_size_bytes = self.status.chunk_size_bytes();
        let committed_path = commit_chunk(
            chunk_path,
            &self.paths.committed_chunks_dir(),
            self.config.sync_on_commit,
        )?;
        self.status.advance_chunk();

        debug!(
            target: "snapstream::writer",
            stream_id = self.stream_id,
            chunk_index,
            chunk_size_bytes,
            path = %committed_path.display(),
            "Chunk committed"
        );
        Ok(())
    }
}

/// Closes the chunk sink on every exit path.
///
/// An explicit [`close`](SinkGuard::close) reports errors; a close on drop
/// (early return after a failure) only logs them.
struct SinkGuard {
    sink: Box<dyn ChunkSink>,
    path: PathBuf,
    closed: bool,
}

impl SinkGuard {
    fn new(sink: Box<dyn ChunkSink>, path: PathBuf) -> Self {
        SinkGuard {
            sink,
            path,
            closed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, element: &Element) -> StreamStatus {
        self.sink
            .append(element)
            .map_err(|e| StreamError::write(&self.path, &e))
    }

    fn close(&mut self) -> StreamStatus {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink
            .close()
            .map_err(|e| StreamError::write(&self.path, &e))
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.sink.close() {
                warn!(
                    target: "snapstream::writer",
                    path = %self.path.display(),
                    error = %e,
                    "Failed to close abandoned chunk"
                );
            }
        }
    }
}
