//! Content hashing for cache freshness checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 64-bit content hash computed using XXH3.
///
/// Two files with the same `ContentHash` are assumed to have identical
/// content. Used by the module cache to decide whether a recorded dependency
/// still matches the file on disk, and as the basis for cache-key digests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(u64);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-64.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(data))
    }

    /// Wraps a raw 64-bit digest that was computed elsewhere.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw 64-bit digest.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:04x}..)", self.0 >> 48)
    }
}
