//! File dependency records embedded in serialized modules.

use lumen_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a recorded dependency is checked against the file on disk.
///
/// Modification time is the cheap default; content hashing survives
/// timestamp churn (build farms, archive extraction) at the cost of reading
/// the file on every check.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DependencyVerifier {
    /// Up-to-date iff the file's mtime equals the recorded value.
    ModificationTime {
        /// Modification time in nanoseconds since the Unix epoch.
        mtime_ns: u64,
    },
    /// Up-to-date iff the XXH3-64 hash of the file's contents equals the
    /// recorded value.
    ContentHash(ContentHash),
}

/// One tracked input of a serialized module.
///
/// A dependency is stored with its size and a verifier. If `sdk_relative`
/// is true the path is relative to the current SDK root, which keeps the
/// record valid when the SDK is moved; otherwise the path is absolute.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FileDependency {
    /// Recorded path: absolute, or SDK-relative when `sdk_relative` is set.
    pub path: PathBuf,
    /// Whether `path` is relative to the SDK root.
    pub sdk_relative: bool,
    /// File size in bytes at record time.
    pub size: u64,
    /// How this dependency is re-checked.
    pub verifier: DependencyVerifier,
}

impl FileDependency {
    /// Creates a modification-time-verified dependency.
    pub fn mod_time_based(
        path: impl Into<PathBuf>,
        sdk_relative: bool,
        size: u64,
        mtime_ns: u64,
    ) -> Self {
        Self {
            path: path.into(),
            sdk_relative,
            size,
            verifier: DependencyVerifier::ModificationTime { mtime_ns },
        }
    }

    /// Creates a content-hash-verified dependency.
    pub fn hash_based(
        path: impl Into<PathBuf>,
        sdk_relative: bool,
        size: u64,
        hash: ContentHash,
    ) -> Self {
        Self {
            path: path.into(),
            sdk_relative,
            size,
            verifier: DependencyVerifier::ContentHash(hash),
        }
    }

    /// Returns `true` if this dependency is verified by modification time.
    pub fn is_modification_time_based(&self) -> bool {
        matches!(self.verifier, DependencyVerifier::ModificationTime { .. })
    }

    /// Resolves the recorded path against `sdk_path` when the record is
    /// SDK-relative. Absolute records are returned unchanged.
    pub fn resolved_path(&self, sdk_path: Option<&Path>) -> PathBuf {
        match (self.sdk_relative, sdk_path) {
            (true, Some(sdk)) => sdk.join(&self.path),
            _ => self.path.clone(),
        }
    }
}
