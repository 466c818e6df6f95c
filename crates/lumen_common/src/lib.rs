//! Shared foundational types used across the Lumen compiler toolchain.
//!
//! This crate provides core types including 64-bit content hashing, interned
//! identifiers, the filesystem abstraction used by the module loaders, and
//! common result types.

#![warn(missing_docs)]

pub mod fs;
pub mod hash;
pub mod ident;
pub mod result;

pub use fs::{FileKind, FileStatus, Filesystem, OsFilesystem};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, LumenResult};
