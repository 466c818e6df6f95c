//! Cache-key derivation and cached-entry path computation.
//!
//! The key disambiguates entries that must not share storage (different
//! compiler versions, interfaces, architectures, SDKs). Everything else,
//! notably the interface's contents and its dependencies, is deliberately
//! left to the up-to-date check of the entry itself, so one key maps to at
//! most one entry that is rebuilt in place rather than piling up dead
//! siblings.

use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::Xxh3;

use lumen_serialization::MODULE_EXTENSION;

/// Derives the cache key for an interface compiled under the given
/// configuration.
///
/// The combine order is fixed so keys are byte-identical across processes:
/// compiler version, interface path, target architecture, SDK root,
/// system-dependency tracking. Each field is length-prefixed so adjacent
/// fields cannot alias. The effective language version is excluded on
/// purpose: modules built in different language modes should share and
/// rebuild one entry, not fork the cache.
pub fn cache_key(
    compiler_version: &str,
    interface_path: &Path,
    target_arch: &str,
    sdk_path: Option<&Path>,
    track_system_dependencies: bool,
) -> String {
    let mut hasher = Xxh3::new();
    combine(&mut hasher, compiler_version.as_bytes());
    combine(&mut hasher, interface_path.to_string_lossy().as_bytes());
    combine(&mut hasher, target_arch.as_bytes());
    combine(
        &mut hasher,
        sdk_path
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
            .as_bytes(),
    );
    combine(&mut hasher, &[track_system_dependencies as u8]);
    to_base36(hasher.digest())
}

/// Computes the writable-cache entry path for a module:
/// `<cache_dir>/<module_name>-<key>.lumenmodule`.
pub fn cached_output_path(cache_dir: &Path, module_name: &str, key: &str) -> PathBuf {
    cache_dir.join(format!("{module_name}-{key}.{MODULE_EXTENSION}"))
}

fn combine(hasher: &mut Xxh3, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out.reverse();
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_for(interface: &str) -> String {
        cache_key(
            "lumen 0.3.0",
            Path::new(interface),
            "arm64",
            Some(Path::new("/sdks/v1")),
            false,
        )
    }

    #[test]
    fn stable_across_calls() {
        assert_eq!(key_for("/src/Core.lumeninterface"), key_for("/src/Core.lumeninterface"));
    }

    #[test]
    fn interface_path_changes_key() {
        assert_ne!(key_for("/src/Core.lumeninterface"), key_for("/other/Core.lumeninterface"));
    }

    #[test]
    fn compiler_version_changes_key() {
        let a = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", None, false);
        let b = cache_key("lumen 0.4.0", Path::new("/i"), "arm64", None, false);
        assert_ne!(a, b);
    }

    #[test]
    fn arch_changes_key() {
        let a = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", None, false);
        let b = cache_key("lumen 0.3.0", Path::new("/i"), "x86_64", None, false);
        assert_ne!(a, b);
    }

    #[test]
    fn sdk_changes_key() {
        let a = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", Some(Path::new("/s1")), false);
        let b = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", Some(Path::new("/s2")), false);
        let c = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", None, false);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn tracking_bit_changes_key() {
        let a = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", None, false);
        let b = cache_key("lumen 0.3.0", Path::new("/i"), "arm64", None, true);
        assert_ne!(a, b);
    }

    #[test]
    fn fields_do_not_alias() {
        // Moving a byte across a field boundary must change the key.
        let a = cache_key("lumen x", Path::new("/i"), "arm64", None, false);
        let b = cache_key("lumen", Path::new("x/i"), "arm64", None, false);
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_lowercase_base36() {
        let key = key_for("/src/Core.lumeninterface");
        assert!(!key.is_empty());
        assert!(key.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }

    #[test]
    fn output_path_shape() {
        let path = cached_output_path(Path::new("/cache"), "Core", "ab12z");
        assert_eq!(path, PathBuf::from("/cache/Core-ab12z.lumenmodule"));
    }
}
