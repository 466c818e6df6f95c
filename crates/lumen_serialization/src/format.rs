//! On-disk layout of serialized modules.
//!
//! Layout: 4 magic bytes, a little-endian `u32` header length, the
//! bincode-encoded [`ModuleHeader`], then the opaque payload. The header
//! carries everything a loader needs to judge the module without
//! deserializing the payload.

use crate::dependency::FileDependency;
use serde::{Deserialize, Serialize};

/// Magic bytes identifying a serialized Lumen module.
pub const MODULE_MAGIC: [u8; 4] = *b"LMOD";

/// Current module format version. Increment on breaking changes to the
/// header or payload layout.
pub const MODULE_FORMAT_VERSION: u32 = 1;

/// File extension for serialized binary modules.
pub const MODULE_EXTENSION: &str = "lumenmodule";

/// Header prepended to every serialized module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleHeader {
    /// Module format version.
    pub format_version: u32,

    /// Full version string of the compiler that produced this module.
    pub compiler_version: String,

    /// Name of the serialized module.
    pub module_name: String,

    /// Files this module was built against. Empty when the producer chose
    /// not to serialize dependencies.
    pub dependencies: Vec<FileDependency>,
}

impl ModuleHeader {
    /// Creates a header for the current format version.
    pub fn new(
        compiler_version: impl Into<String>,
        module_name: impl Into<String>,
        dependencies: Vec<FileDependency>,
    ) -> Self {
        Self {
            format_version: MODULE_FORMAT_VERSION,
            compiler_version: compiler_version.into(),
            module_name: module_name.into(),
            dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_header_uses_current_version() {
        let h = ModuleHeader::new("lumen 0.3.0", "Core", vec![]);
        assert_eq!(h.format_version, MODULE_FORMAT_VERSION);
        assert_eq!(h.module_name, "Core");
        assert!(h.dependencies.is_empty());
    }

    #[test]
    fn magic_is_printable() {
        assert_eq!(&MODULE_MAGIC, b"LMOD");
    }
}
