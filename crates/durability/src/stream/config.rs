//! Stream writer configuration.

/// Default maximum chunk size: 10 GiB
pub const DEFAULT_MAX_CHUNK_SIZE_BYTES: u64 = 10 * (1 << 30);

/// Stream writer configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamWriterConfig {
    /// Soft cap on the estimated bytes per chunk (default: 10GiB).
    ///
    /// Checked before each element is written, so a chunk can exceed it by
    /// at most one element.
    pub max_chunk_size_bytes: u64,

    /// fsync each chunk on close and the committed directory after each
    /// rename (default: false).
    pub sync_on_commit: bool,
}

impl Default for StreamWriterConfig {
    fn default() -> Self {
        StreamWriterConfig {
            max_chunk_size_bytes: DEFAULT_MAX_CHUNK_SIZE_BYTES,
            sync_on_commit: false,
        }
    }
}

impl StreamWriterConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk size (builder pattern).
    pub fn with_max_chunk_size_bytes(mut self, max: u64) -> Self {
        self.max_chunk_size_bytes = max;
        self
    }

    /// Set the maximum chunk size if given, otherwise reset to the default.
    pub fn with_optional_max_chunk_size_bytes(mut self, max: Option<u64>) -> Self {
        self.max_chunk_size_bytes = max.unwrap_or(DEFAULT_MAX_CHUNK_SIZE_BYTES);
        self
    }

    /// Enable or disable fsync on commit (builder pattern).
    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), StreamConfigError> {
        if self.max_chunk_size_bytes == 0 {
            return Err(StreamConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Create a configuration optimized for testing (small chunks).
    pub fn for_testing() -> Self {
        StreamWriterConfig {
            max_chunk_size_bytes: 4 * 1024,
            sync_on_commit: false,
        }
    }
}

/// Stream writer configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamConfigError {
    /// A zero chunk size would never let an element in.
    #[error("Maximum chunk size must be greater than zero")]
    ZeroChunkSize,
}
