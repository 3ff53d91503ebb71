//! Error types for the in-memory store.

use matpath::NodeId;
use matpath_engine::TreeError;

#[cfg(feature = "persistence")]
use std::path::PathBuf;

/// Result type for store operations.
pub type MemoryStoreResult<T> = Result<T, MemoryStoreError>;

/// Errors that can occur while building, saving or loading a store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    /// Two rows share the same key.
    #[error("duplicate node {0}")]
    DuplicateNode(NodeId),

    /// I/O error during persistence operations.
    #[cfg(feature = "persistence")]
    #[error("I/O error at {path}: {source}")]
    IoError {
        /// File being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[cfg(feature = "persistence")]
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error.
    #[cfg(feature = "persistence")]
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Snapshot written by an incompatible version.
    #[cfg(feature = "persistence")]
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
}

impl MemoryStoreError {
    /// Creates an I/O error with path context.
    #[cfg(feature = "persistence")]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

impl From<MemoryStoreError> for TreeError {
    fn from(err: MemoryStoreError) -> Self {
        TreeError::store(err)
    }
}
