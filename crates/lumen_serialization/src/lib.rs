//! The Lumen binary module format.
//!
//! A serialized module is the compact compiled artifact the module loaders
//! hand to the rest of the compiler. Every module is self-describing: a
//! magic number, a header carrying the producing compiler version, the
//! module name, and the full list of file dependencies the module was built
//! against, followed by the opaque payload. The embedded dependency list is
//! what makes cached modules provably up-to-date without consulting any
//! side tables.

#![warn(missing_docs)]

pub mod dependency;
pub mod error;
pub mod format;
pub mod validation;
pub mod writer;

pub use dependency::{DependencyVerifier, FileDependency};
pub use error::SerializationError;
pub use format::{ModuleHeader, MODULE_EXTENSION, MODULE_FORMAT_VERSION, MODULE_MAGIC};
pub use validation::{is_serialized_module, validate_module, ModuleStatus, ValidationInfo};
pub use writer::{encode_module, write_module};
