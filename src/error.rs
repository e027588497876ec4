//! Error types for the store
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the fallible store operations.
///
/// Only persistence can fail; in-memory operations are infallible.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failure on the given path
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot could not be serialized
    #[error("Encode failed: {0}")]
    Encode(#[source] bincode::Error),

    /// Snapshot could not be deserialized
    #[error("Decode failed: {0}")]
    Decode(#[source] bincode::Error),

    /// File is not a store snapshot
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// Snapshot was written with a format this build does not read
    #[error("Unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Filename cannot be resolved under the base directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    // == Constructors ==
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    // == Not Found ==
    /// Returns true if the error means the target file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;
