//! Module-interface resolution and build caching for the Lumen compiler.
//!
//! A module interface (`.lumeninterface`) is the stable textual summary of a
//! module's public API. This crate locates or produces the corresponding
//! binary module (`.lumenmodule`), reusing prior work when it is provably
//! up-to-date against the module's recorded file dependencies and invoking
//! a sub-compilation otherwise.
//!
//! A resolve searches three storage tiers in order: the per-user writable
//! module cache, the read-only prebuilt cache shipped with the toolchain,
//! and a binary module placed adjacent to the interface. When the winning
//! artifact comes from the prebuilt cache, a small textual forwarding
//! record is installed in the writable cache so the next lookup validates
//! freshness without re-reading the prebuilt manifest.

#![warn(missing_docs)]

pub mod builder;
pub mod cache_path;
pub mod compiler;
pub mod context;
pub mod dep_verify;
pub mod diag;
pub mod discovery;
pub mod error;
pub mod forwarding;
pub mod interface;
pub mod invocation;
pub mod loader;
pub mod tracker;

pub use builder::InterfaceBuilder;
pub use compiler::{CompileFailed, SubCompiler};
pub use context::ResolveContext;
pub use dep_verify::DependencyValidator;
pub use discovery::{DiscoveredModule, LoadMode};
pub use error::{BuildError, ModuleLoadError};
pub use forwarding::{ForwardingDependency, ForwardingModule};
pub use interface::{InterfaceVersion, INTERFACE_EXTENSION, INTERFACE_FORMAT_VERSION};
pub use invocation::{InputKind, OptimizationMode, SubInvocation};
pub use loader::{build_module_from_interface, InterfaceModuleLoader, LoadedModuleFiles};
pub use tracker::{DependencyCollector, DependencyTracker, TrackedDependency};
