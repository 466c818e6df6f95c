//! Ambient compiler state threaded through a resolve.

use std::path::PathBuf;

use lumen_common::Interner;

/// The host-session state a resolve needs.
///
/// There are no process-wide singletons in the loader subsystem; everything
/// the resolver inherits from the invoking compiler session travels in this
/// value.
pub struct ResolveContext {
    /// Full version string of the host compiler, e.g. `"lumen 0.3.0 (f9a1c2d)"`.
    /// Goes into the cache key so toolchain upgrades never share entries.
    pub compiler_version: String,

    /// Target triple of the host session, e.g. `"arm64-unknown-linux"`.
    pub target_triple: String,

    /// Root of the active SDK, when one is selected. Dependencies under
    /// this root are recorded SDK-relative so cache entries survive an SDK
    /// move.
    pub sdk_path: Option<PathBuf>,

    /// Module import search paths inherited by sub-builds.
    pub import_search_paths: Vec<PathBuf>,

    /// Path to the compiler's runtime resource directory.
    pub runtime_resource_path: Option<PathBuf>,

    /// Whether the session runs in debugger support mode. Inherited by
    /// sub-builds, where it softens certain diagnostics.
    pub debugger_support: bool,

    /// Whether the host's foreign-import layer keeps detailed records.
    /// Propagated to sub-builds so tooling sessions see consistent state.
    pub detailed_import_records: bool,

    /// Session string interner. Owns the interface flag tokens for the
    /// duration of a resolve.
    pub interner: Interner,
}

impl ResolveContext {
    /// Creates a context with the given compiler version and target triple.
    /// Everything else starts empty or disabled.
    pub fn new(compiler_version: impl Into<String>, target_triple: impl Into<String>) -> Self {
        Self {
            compiler_version: compiler_version.into(),
            target_triple: target_triple.into(),
            sdk_path: None,
            import_search_paths: Vec::new(),
            runtime_resource_path: None,
            debugger_support: false,
            detailed_import_records: false,
            interner: Interner::new(),
        }
    }

    /// Returns the architecture component of the target triple.
    pub fn target_arch(&self) -> &str {
        self.target_triple.split('-').next().unwrap_or("")
    }
}
