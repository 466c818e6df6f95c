//! Assembling and atomically writing serialized modules.

use std::path::Path;

use lumen_common::Filesystem;

use crate::error::SerializationError;
use crate::format::{ModuleHeader, MODULE_MAGIC};

/// Encodes a module into its on-disk byte layout without writing it.
pub fn encode_module(
    header: &ModuleHeader,
    payload: &[u8],
) -> Result<Vec<u8>, SerializationError> {
    let header_bytes = bincode::serde::encode_to_vec(header, bincode::config::standard())
        .map_err(|e| SerializationError::Encode {
            reason: e.to_string(),
        })?;

    let header_len = header_bytes.len() as u32;
    let mut out = Vec::with_capacity(MODULE_MAGIC.len() + 4 + header_bytes.len() + payload.len());
    out.extend_from_slice(&MODULE_MAGIC);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Serializes a module to `path` and returns the exact bytes written.
///
/// The write goes through the filesystem's temp-file-plus-rename path so a
/// concurrent reader never observes a truncated entry. Returning the bytes
/// lets callers hand out a buffer that is bit-identical to the file.
pub fn write_module(
    fs: &dyn Filesystem,
    path: &Path,
    header: &ModuleHeader,
    payload: &[u8],
) -> Result<Vec<u8>, SerializationError> {
    let bytes = encode_module(header, payload)?;
    fs.write_atomic(path, &bytes)
        .map_err(|source| SerializationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(bytes)
}
