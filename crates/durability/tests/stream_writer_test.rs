//! Snapshot stream writer end-to-end tests
//!
//! These tests drive a real writer thread against a temporary snapshot
//! directory:
//! - Normal drain and forced rotation
//! - Cursor failure mid-stream
//! - Cancellation mid-chunk, and cancellation racing a failure
//! - Concurrent waiters

use std::sync::Arc;

use snapstream_core::{CursorError, Element, SnapshotPaths, StreamError, StreamErrorKind};
use snapstream_durability::testing::{FailingCursor, GatedCursor, VecCursor};
use snapstream_durability::{
    list_committed_chunks, list_uncommitted_chunks, ChunkReader, SnapshotStreamWriter,
};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Read every committed chunk, in index order
fn committed_chunks(paths: &SnapshotPaths) -> Vec<Vec<Element>> {
    list_committed_chunks(paths)
        .unwrap()
        .into_iter()
        .map(|index| {
            ChunkReader::open(paths.committed_chunk_path(index))
                .unwrap()
                .read_all()
                .unwrap()
        })
        .collect()
}

fn sizes_of(chunk: &[Element]) -> Vec<u64> {
    chunk.iter().map(|e| e.estimated_size_bytes()).collect()
}

#[test]
fn test_normal_drain_fills_first_chunk() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let writer = SnapshotStreamWriter::new(
        VecCursor::with_sizes(&[400, 400, 400]),
        temp_dir.path(),
        0,
        Some(1000),
    )
    .unwrap();

    assert_eq!(writer.wait(), Ok(()));

    // The third write takes chunk_0 past the cap before end of sequence is
    // seen, so end of sequence lands in an empty tail chunk
    let chunks = committed_chunks(writer.paths());
    assert_eq!(chunks.len(), 2);
    assert_eq!(sizes_of(&chunks[0]), vec![400, 400, 400]);
    assert!(chunks[1].is_empty());
    assert_eq!(writer.chunk_index(), 2);
    assert_eq!(writer.chunk_size_bytes(), 0);
}

#[test]
fn test_forced_rotation() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let writer = SnapshotStreamWriter::new(
        VecCursor::with_sizes(&[300, 300, 300]),
        temp_dir.path(),
        0,
        Some(500),
    )
    .unwrap();

    assert_eq!(writer.wait(), Ok(()));

    let paths = writer.paths();
    assert_eq!(list_committed_chunks(paths).unwrap(), vec![0, 1]);
    let chunks = committed_chunks(paths);
    assert_eq!(sizes_of(&chunks[0]), vec![300, 300]);
    assert_eq!(sizes_of(&chunks[1]), vec![300]);

    // Pull order preserved across the rotation
    let fills: Vec<u8> = chunks
        .iter()
        .flatten()
        .map(|e| e.components()[0][0])
        .collect();
    assert_eq!(fills, vec![0, 1, 2]);

    assert!(list_uncommitted_chunks(paths, 0).unwrap().is_empty());
}

#[test]
fn test_cursor_failure_mid_stream() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let cursor = FailingCursor::new(VecCursor::with_sizes(&[100, 100, 100]), 1);
    let writer = SnapshotStreamWriter::new(cursor, temp_dir.path(), 5, Some(1000)).unwrap();

    let err = writer.wait().unwrap_err();
    assert_eq!(err.kind(), StreamErrorKind::Read);
    assert!(matches!(err, StreamError::Read(CursorError::Source(_))));

    let paths = writer.paths();
    assert!(paths.uncommitted_chunks_dir(5).is_dir());
    assert!(list_committed_chunks(paths).unwrap().is_empty());
    assert_eq!(list_uncommitted_chunks(paths, 5).unwrap(), vec![0]);

    // The abandoned chunk holds what was written before the failure
    let abandoned = ChunkReader::open(paths.uncommitted_chunk_path(5, 0))
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(sizes_of(&abandoned), vec![100]);

    // Terminal status is stable
    assert_eq!(writer.status(), Err(err.clone()));
    assert_eq!(writer.wait(), Err(err));
}

#[test]
fn test_cancel_mid_chunk() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    // Chunk 0 takes two elements, chunk 1 gets one, then the cursor parks
    let (cursor, gate) = GatedCursor::new(VecCursor::with_sizes(&[10; 6]), 3);
    let writer = SnapshotStreamWriter::new(cursor, temp_dir.path(), 1, Some(20)).unwrap();

    gate.wait_until_blocked();
    assert_eq!(writer.chunk_index(), 1);
    assert_eq!(writer.chunk_size_bytes(), 10);

    writer.cancel();
    gate.open();

    let err = writer.wait().unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err, StreamError::cancelled(1));

    // The parked pull completes and its element lands in chunk 1, which is
    // committed before the writer stops; nothing pulled is lost
    let paths = writer.paths();
    assert_eq!(list_committed_chunks(paths).unwrap(), vec![0, 1]);
    assert!(list_uncommitted_chunks(paths, 1).unwrap().is_empty());
    let chunks = committed_chunks(paths);
    assert_eq!(sizes_of(&chunks[0]), vec![10, 10]);
    assert_eq!(sizes_of(&chunks[1]), vec![10, 10]);
    assert_eq!(writer.chunk_index(), 2);
    assert!(!writer.end_of_sequence());
}

#[test]
fn test_cancel_while_first_pull_parked() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let (cursor, gate) = GatedCursor::new(VecCursor::with_sizes(&[10, 10]), 0);
    let writer = SnapshotStreamWriter::new(cursor, temp_dir.path(), 0, None).unwrap();

    gate.wait_until_blocked();
    writer.cancel();
    writer.cancel();
    gate.open();

    assert!(writer.wait().unwrap_err().is_cancelled());
    assert!(writer.is_finished());

    // The element pulled while cancelling is committed; the stream stops there
    let chunks = committed_chunks(writer.paths());
    assert_eq!(chunks.len(), 1);
    assert_eq!(sizes_of(&chunks[0]), vec![10]);
    assert!(list_uncommitted_chunks(writer.paths(), 0).unwrap().is_empty());
}

#[test]
fn test_cancel_racing_failure_settles() {
    init_tracing();
    for _ in 0..20 {
        let temp_dir = TempDir::new().unwrap();
        let cursor = FailingCursor::new(VecCursor::with_sizes(&[1; 50]), 25);
        let writer = Arc::new(
            SnapshotStreamWriter::new(cursor, temp_dir.path(), 0, Some(8)).unwrap(),
        );

        let canceller = {
            let writer = Arc::clone(&writer);
            std::thread::spawn(move || writer.cancel())
        };
        let status = writer.wait();
        canceller.join().unwrap();

        let kind = status.clone().unwrap_err().kind();
        assert!(
            kind == StreamErrorKind::Cancelled || kind == StreamErrorKind::Read,
            "unexpected terminal status {:?}",
            status
        );
        assert_eq!(writer.wait(), status);

        // Whatever was committed is contiguous from zero
        let committed = list_committed_chunks(writer.paths()).unwrap();
        let expected: Vec<u64> = (0..committed.len() as u64).collect();
        assert_eq!(committed, expected);
    }
}

#[test]
fn test_concurrent_waiters_see_same_status() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let (cursor, gate) = GatedCursor::new(VecCursor::with_sizes(&[64; 10]), 4);
    let writer = Arc::new(
        SnapshotStreamWriter::new(cursor, temp_dir.path(), 0, Some(128)).unwrap(),
    );

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let writer = Arc::clone(&writer);
            std::thread::spawn(move || writer.wait())
        })
        .collect();

    gate.wait_until_blocked();
    assert!(!writer.is_finished());
    gate.open();

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(()));
    }
    assert_eq!(writer.wait(), Ok(()));

    // 10 elements of 64 bytes, two per chunk, plus an empty tail chunk
    let chunks = committed_chunks(writer.paths());
    assert_eq!(chunks.len(), 6);
    assert!(chunks[..5].iter().all(|c| c.len() == 2));
    assert!(chunks[5].is_empty());
}

#[test]
fn test_writer_creates_only_its_stream_directories() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let first =
        SnapshotStreamWriter::new(VecCursor::with_sizes(&[5]), temp_dir.path(), 0, None).unwrap();
    assert_eq!(first.wait(), Ok(()));

    let paths = first.paths().clone();
    assert!(paths.uncommitted_chunks_dir(0).is_dir());
    assert!(!paths.uncommitted_chunks_dir(1).exists());
    assert!(paths.committed_chunks_dir().is_dir());
    assert_eq!(list_committed_chunks(&paths).unwrap(), vec![0]);
}
