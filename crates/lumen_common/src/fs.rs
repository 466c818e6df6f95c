//! Filesystem abstraction for the module loaders.
//!
//! The module cache and interface resolver never touch `std::fs` directly;
//! they go through the [`Filesystem`] trait so tests and embedders can
//! substitute their own view of the disk. [`OsFilesystem`] is the production
//! implementation.

use std::io::{self, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

use tempfile::NamedTempFile;

/// The kind of filesystem entry a [`FileStatus`] describes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else (symlink, device, socket).
    Other,
}

/// A snapshot of a file's metadata at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FileStatus {
    /// File size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime_ns: u64,
    /// The kind of entry.
    pub kind: FileKind,
}

/// The filesystem capabilities the module loaders depend on.
///
/// All operations are synchronous. `write_atomic` must guarantee that a
/// concurrent reader observes either the previous contents or the new
/// contents in full, never a truncated file. Implementations must be
/// `Sync`: the sub-build worker thread shares the session filesystem.
pub trait Filesystem: Sync {
    /// Returns metadata for the entry at `path`.
    fn status(&self, path: &Path) -> io::Result<FileStatus>;

    /// Reads the full contents of the file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `bytes` to `path` through a temporary file and a rename.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Returns `true` if an entry exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn status(&self, path: &Path) -> io::Result<FileStatus> {
        let meta = std::fs::metadata(path)?;
        let kind = if meta.is_file() {
            FileKind::File
        } else if meta.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        let mtime_ns = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Ok(FileStatus {
            size: meta.len(),
            mtime_ns,
            kind,
        })
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(bytes)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_of_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iface.lumeninterface");
        std::fs::write(&path, b"// contents").unwrap();

        let fs = OsFilesystem;
        let st = fs.status(&path).unwrap();
        assert_eq!(st.size, 11);
        assert_eq!(st.kind, FileKind::File);
        assert!(st.mtime_ns > 0);
    }

    #[test]
    fn status_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFilesystem;
        let st = fs.status(dir.path()).unwrap();
        assert_eq!(st.kind, FileKind::Directory);
    }

    #[test]
    fn status_of_missing_file_errors() {
        let fs = OsFilesystem;
        assert!(fs.status(Path::new("/nonexistent/file")).is_err());
    }

    #[test]
    fn read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, b"module bytes").unwrap();

        let fs = OsFilesystem;
        assert_eq!(fs.read(&path).unwrap(), b"module bytes");
    }

    #[test]
    fn write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.lumenmodule");

        let fs = OsFilesystem;
        fs.write_atomic(&path, b"serialized").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"serialized");
    }

    #[test]
    fn write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.lumenmodule");
        std::fs::write(&path, b"old").unwrap();

        let fs = OsFilesystem;
        fs.write_atomic(&path, b"new contents").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry");

        let fs = OsFilesystem;
        fs.write_atomic(&path, b"bytes").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn exists_reflects_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("present");
        let fs = OsFilesystem;
        assert!(!fs.exists(&path));
        std::fs::write(&path, b"").unwrap();
        assert!(fs.exists(&path));
    }

    #[test]
    fn create_dir_all_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let fs = OsFilesystem;
        fs.create_dir_all(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
