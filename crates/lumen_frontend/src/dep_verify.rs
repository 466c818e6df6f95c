//! Checking recorded dependencies against the files on disk.

use std::path::Path;

use lumen_common::{ContentHash, Filesystem};
use lumen_serialization::{DependencyVerifier, FileDependency};

use crate::tracker::DependencyTracker;

/// A file buffer that is read at most once, on first use.
///
/// Hash verification and cached-module extraction both want the bytes of a
/// dependency; routing them through one of these keeps each validation to
/// a single read.
pub(crate) struct LazyFileBuffer<'a> {
    fs: &'a dyn Filesystem,
    path: &'a Path,
    buf: Option<Option<Vec<u8>>>,
}

impl<'a> LazyFileBuffer<'a> {
    pub(crate) fn new(fs: &'a dyn Filesystem, path: &'a Path) -> Self {
        Self {
            fs,
            path,
            buf: None,
        }
    }

    /// Returns the file contents, reading them on the first call. A failed
    /// read is remembered and keeps returning `None`.
    pub(crate) fn get(&mut self) -> Option<&[u8]> {
        self.buf
            .get_or_insert_with(|| self.fs.read(self.path).ok())
            .as_deref()
    }
}

/// Validates batches of [`FileDependency`] records against the disk.
pub struct DependencyValidator<'a> {
    fs: &'a dyn Filesystem,
    sdk_path: Option<&'a Path>,
    tracker: Option<&'a dyn DependencyTracker>,
}

impl<'a> DependencyValidator<'a> {
    /// Creates a validator. SDK-relative records are resolved against
    /// `sdk_path`; every consulted path is reported to `tracker`.
    pub fn new(
        fs: &'a dyn Filesystem,
        sdk_path: Option<&'a Path>,
        tracker: Option<&'a dyn DependencyTracker>,
    ) -> Self {
        Self {
            fs,
            sdk_path,
            tracker,
        }
    }

    /// Checks a whole batch. The batch is up-to-date iff every record is.
    ///
    /// Every record is visited even after a mismatch is found, so the
    /// ambient tracker sees the complete dependency set; downstream build
    /// systems rely on observing a superset of the final manifest.
    pub fn dependencies_are_up_to_date(&self, deps: &[FileDependency]) -> bool {
        let mut all_up_to_date = true;
        for dep in deps {
            let full_path = dep.resolved_path(self.sdk_path);
            if let Some(tracker) = self.tracker {
                tracker.add_dependency(&full_path, dep.sdk_relative);
            }
            if !self.dependency_is_up_to_date(dep, &full_path) {
                all_up_to_date = false;
            }
        }
        all_up_to_date
    }

    /// Checks one record against the file at `full_path`.
    ///
    /// A stat failure means out-of-date, never an error; the caller decides
    /// whether to rebuild or fall through to another tier.
    fn dependency_is_up_to_date(&self, dep: &FileDependency, full_path: &Path) -> bool {
        let Ok(status) = self.fs.status(full_path) else {
            return false;
        };
        if status.size != dep.size {
            return false;
        }
        match dep.verifier {
            DependencyVerifier::ModificationTime { mtime_ns } => status.mtime_ns == mtime_ns,
            DependencyVerifier::ContentHash(recorded) => {
                let mut buf = LazyFileBuffer::new(self.fs, full_path);
                match buf.get() {
                    Some(bytes) => ContentHash::from_bytes(bytes) == recorded,
                    None => false,
                }
            }
        }
    }
}
