//! Error types for module serialization.

use std::path::PathBuf;

/// Errors that can occur while encoding or writing a serialized module.
///
/// Reads are fail-safe and reported through
/// [`ModuleStatus`](crate::validation::ModuleStatus) instead; this enum
/// covers the write path, where failures must surface to the caller so a
/// half-built cache entry is never left behind.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// An I/O error occurred while writing the module file.
    #[error("module I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The module header could not be encoded.
    #[error("failed to encode module header: {reason}")]
    Encode {
        /// Description of the encoding failure.
        reason: String,
    },
}
