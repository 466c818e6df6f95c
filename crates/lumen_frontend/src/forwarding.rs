//! The forwarding-record document stored in the writable cache.
//!
//! A forwarding record is a small YAML file stored under the module
//! extension. It points at a module in the prebuilt cache and carries its
//! own dependency list, validated independently of the prebuilt module's
//! embedded manifest, so later lookups never re-read the prebuilt tree.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The only forwarding-record version this compiler reads or writes.
pub const FORWARDING_FORMAT_VERSION: u32 = 1;

/// One dependency of a forwarding record.
///
/// Always absolute and always mtime-verified; SDK-relative and hash-based
/// forms are expanded and re-stated when the record is written, so the
/// file is self-contained.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ForwardingDependency {
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime: u64,
    /// Absolute path of the dependency.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// A parsed forwarding record.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ForwardingModule {
    /// Absolute path of the underlying module in the prebuilt cache.
    #[serde(rename = "path")]
    pub underlying_module_path: PathBuf,
    /// Independently tracked dependencies, underlying module first.
    pub dependencies: Vec<ForwardingDependency>,
    /// Record format version.
    pub version: u32,
}

/// Why a forwarding record could not be loaded or written.
#[derive(Debug, thiserror::Error)]
pub enum ForwardingError {
    /// The document did not parse or serialize as YAML.
    #[error("malformed forwarding record: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document declares a version this compiler does not support.
    #[error("unsupported forwarding record version {0}")]
    UnsupportedVersion(u32),

    /// The record could not be written to the cache.
    #[error("forwarding record I/O error at {path}: {source}")]
    Io {
        /// The path being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl ForwardingModule {
    /// Creates an empty record pointing at `underlying_module_path`.
    pub fn new(underlying_module_path: impl Into<PathBuf>) -> Self {
        Self {
            underlying_module_path: underlying_module_path.into(),
            dependencies: Vec::new(),
            version: FORWARDING_FORMAT_VERSION,
        }
    }

    /// Appends a dependency observation.
    pub fn add_dependency(&mut self, path: impl Into<PathBuf>, size: u64, mtime: u64) {
        self.dependencies.push(ForwardingDependency {
            mtime,
            path: path.into(),
            size,
        });
    }

    /// Parses a forwarding record from the raw bytes of a cache entry.
    ///
    /// Rejects any version other than the supported one, so future formats
    /// read as absent entries rather than misinterpreted ones.
    pub fn load(bytes: &[u8]) -> Result<Self, ForwardingError> {
        let fwd: ForwardingModule = serde_yaml::from_slice(bytes)?;
        if fwd.version != FORWARDING_FORMAT_VERSION {
            return Err(ForwardingError::UnsupportedVersion(fwd.version));
        }
        Ok(fwd)
    }

    /// Serializes the record to its YAML document form.
    pub fn to_yaml(&self) -> Result<String, ForwardingError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ForwardingModule {
        let mut fwd = ForwardingModule::new("/toolchain/prebuilt/Core.lumenmodule");
        fwd.add_dependency("/toolchain/prebuilt/Core.lumenmodule", 4096, 111);
        fwd.add_dependency("/sdks/v1/usr/lib/Core.lumeninterface", 880, 222);
        fwd
    }

    #[test]
    fn roundtrip_is_structurally_equal() {
        let fwd = sample();
        let yaml = fwd.to_yaml().unwrap();
        let back = ForwardingModule::load(yaml.as_bytes()).unwrap();
        assert_eq!(back, fwd);
    }

    #[test]
    fn field_order_matches_format() {
        let yaml = sample().to_yaml().unwrap();
        let path_at = yaml.find("path:").unwrap();
        let deps_at = yaml.find("dependencies:").unwrap();
        let version_at = yaml.find("version:").unwrap();
        assert!(path_at < deps_at && deps_at < version_at);

        // Dependency mappings keep the mtime/path/size key order.
        let mtime_at = yaml.find("mtime:").unwrap();
        let dep_path_at = yaml[deps_at..].find("path:").unwrap() + deps_at;
        let size_at = yaml.find("size:").unwrap();
        assert!(mtime_at < dep_path_at && dep_path_at < size_at);
    }

    #[test]
    fn sequence_is_block_style() {
        let yaml = sample().to_yaml().unwrap();
        assert!(yaml.contains("\n- ") || yaml.contains("\n  - "), "{yaml}");
    }

    #[test]
    fn unsupported_version_rejected() {
        let mut fwd = sample();
        fwd.version = 2;
        let yaml = fwd.to_yaml().unwrap();
        let err = ForwardingModule::load(yaml.as_bytes()).unwrap_err();
        assert!(matches!(err, ForwardingError::UnsupportedVersion(2)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ForwardingModule::load(b"{{{ not yaml").is_err());
    }

    #[test]
    fn binary_module_bytes_are_rejected() {
        // A serialized module starts with the LMOD magic; it must not parse
        // as a forwarding record.
        assert!(ForwardingModule::load(b"LMOD\x10\x00\x00\x00binary").is_err());
    }

    #[test]
    fn new_record_uses_current_version() {
        let fwd = ForwardingModule::new("/p");
        assert_eq!(fwd.version, FORWARDING_FORMAT_VERSION);
        assert!(fwd.dependencies.is_empty());
    }
}
