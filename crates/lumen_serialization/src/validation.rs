//! Fail-safe validation of serialized module buffers.

use crate::dependency::FileDependency;
use crate::format::{ModuleHeader, MODULE_FORMAT_VERSION, MODULE_MAGIC};

/// Result of structurally validating a serialized module buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModuleStatus {
    /// The buffer is a well-formed module in the current format.
    Valid,
    /// The buffer is not a serialized module, or its header is damaged.
    Malformed,
    /// The module was produced by a newer, incompatible format.
    FormatTooNew,
    /// The module was produced by an older, incompatible format.
    FormatTooOld,
}

/// The outcome of [`validate_module`]: a status plus whatever could be
/// extracted from the header.
#[derive(Clone, Debug)]
pub struct ValidationInfo {
    /// Structural verdict for the buffer.
    pub status: ModuleStatus,
    /// Name of the module, when the header decoded.
    pub module_name: Option<String>,
    /// Embedded dependency list, when the header decoded. Empty for
    /// modules serialized without dependencies.
    pub dependencies: Vec<FileDependency>,
}

impl ValidationInfo {
    fn invalid(status: ModuleStatus) -> Self {
        Self {
            status,
            module_name: None,
            dependencies: Vec::new(),
        }
    }
}

/// Returns `true` if `bytes` begins with the serialized-module magic.
///
/// This is the probe the loaders use to distinguish a binary module from a
/// textual forwarding record stored under the same cache path.
pub fn is_serialized_module(bytes: &[u8]) -> bool {
    bytes.len() >= MODULE_MAGIC.len() && bytes[..MODULE_MAGIC.len()] == MODULE_MAGIC
}

/// Structurally validates a serialized module buffer and extracts its
/// embedded dependency list.
///
/// This never fails hard: any damage results in a non-`Valid` status so
/// callers can treat the buffer as a cache miss.
pub fn validate_module(bytes: &[u8]) -> ValidationInfo {
    if !is_serialized_module(bytes) {
        return ValidationInfo::invalid(ModuleStatus::Malformed);
    }

    let rest = &bytes[MODULE_MAGIC.len()..];
    if rest.len() < 4 {
        return ValidationInfo::invalid(ModuleStatus::Malformed);
    }
    let header_len = match rest[..4].try_into() {
        Ok(raw) => u32::from_le_bytes(raw) as usize,
        Err(_) => return ValidationInfo::invalid(ModuleStatus::Malformed),
    };
    let rest = &rest[4..];
    if rest.len() < header_len {
        return ValidationInfo::invalid(ModuleStatus::Malformed);
    }

    let header: ModuleHeader = match bincode::serde::decode_from_slice(
        &rest[..header_len],
        bincode::config::standard(),
    ) {
        Ok((header, _)) => header,
        Err(_) => return ValidationInfo::invalid(ModuleStatus::Malformed),
    };

    let status = if header.format_version > MODULE_FORMAT_VERSION {
        ModuleStatus::FormatTooNew
    } else if header.format_version < MODULE_FORMAT_VERSION {
        ModuleStatus::FormatTooOld
    } else {
        ModuleStatus::Valid
    };

    ValidationInfo {
        status,
        module_name: Some(header.module_name),
        dependencies: header.dependencies,
    }
}
