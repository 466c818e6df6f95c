//! Building a binary module from its interface in a sub-compilation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;

use lumen_common::{ContentHash, Filesystem};
use lumen_diagnostics::{Diagnostic, DiagnosticSink};
use lumen_serialization::{
    validate_module, write_module, FileDependency, ModuleHeader, ModuleStatus, MODULE_EXTENSION,
};

use crate::compiler::SubCompiler;
use crate::context::ResolveContext;
use crate::dep_verify::LazyFileBuffer;
use crate::diag;
use crate::error::BuildError;
use crate::interface::{extract_interface_header, InterfaceHeaderError, INTERFACE_FORMAT_VERSION};
use crate::invocation::{InputKind, OptimizationMode, SubInvocation};
use crate::tracker::{DependencyCollector, DependencyTracker};

/// Stack size of the sub-build worker thread.
const SUB_BUILD_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Compiles a module interface into a serialized module at a chosen output
/// path, collecting the dependency manifest to embed.
///
/// The sub-invocation is configured up front from host state; the frozen
/// flags line of the interface is replayed on top when the build runs.
pub struct InterfaceBuilder<'a> {
    ctx: &'a ResolveContext,
    fs: &'a dyn Filesystem,
    sink: &'a DiagnosticSink,
    compiler: &'a dyn SubCompiler,
    interface_path: &'a Path,
    module_cache_path: Option<&'a Path>,
    tracker: Option<&'a dyn DependencyTracker>,
    sub_invocation: SubInvocation,
}

impl<'a> InterfaceBuilder<'a> {
    /// Creates a builder for compiling `interface_path` into a module named
    /// `module_name`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &'a ResolveContext,
        fs: &'a dyn Filesystem,
        sink: &'a DiagnosticSink,
        compiler: &'a dyn SubCompiler,
        interface_path: &'a Path,
        module_name: &str,
        module_cache_path: Option<&'a Path>,
        prebuilt_cache_path: Option<&'a Path>,
        serialize_dependency_hashes: bool,
        track_system_dependencies: bool,
        tracker: Option<&'a dyn DependencyTracker>,
    ) -> Self {
        let mut invocation = SubInvocation::new(module_name, interface_path);
        invocation.input_kind = InputKind::ModuleInterface;
        invocation.target_triple = ctx.target_triple.clone();
        invocation.sdk_path = ctx.sdk_path.clone();
        invocation.import_search_paths = ctx.import_search_paths.clone();
        invocation.runtime_resource_path = ctx.runtime_resource_path.clone();
        invocation.module_cache_path = module_cache_path.map(Path::to_path_buf);
        invocation.prebuilt_module_cache_path = prebuilt_cache_path.map(Path::to_path_buf);
        invocation.track_system_dependencies = track_system_dependencies;
        invocation.serialize_dependency_hashes = serialize_dependency_hashes;

        // The user is in no position to fix warnings in a printed
        // interface.
        invocation.suppress_warnings = true;

        // Inherited so child diagnostics soften the same way host ones do.
        invocation.debugger_support = ctx.debugger_support;
        invocation.detailed_import_records = ctx.detailed_import_records;

        // Printed interfaces always spell runtime attributes out, even in
        // modules that never import the runtime support module.
        invocation.extern_attr_requires_runtime = false;

        Self {
            ctx,
            fs,
            sink,
            compiler,
            interface_path,
            module_cache_path,
            tracker,
            sub_invocation: invocation,
        }
    }

    /// The configured sub-invocation, before the flags line is replayed.
    pub fn sub_invocation(&self) -> &SubInvocation {
        &self.sub_invocation
    }

    /// Builds the module at `out_path` and returns the serialized bytes,
    /// which are bit-identical to the written file.
    ///
    /// The build runs on a dedicated worker thread so a crash inside the
    /// child compilation fails the resolve instead of taking down the host
    /// process. `should_serialize_deps` controls whether the collected
    /// manifest is embedded.
    pub fn build_module(
        &self,
        out_path: &Path,
        should_serialize_deps: bool,
    ) -> Result<Vec<u8>, BuildError> {
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("lumen-interface-build".to_string())
                .stack_size(SUB_BUILD_STACK_SIZE);
            match worker.spawn_scoped(scope, || {
                self.build_on_worker(out_path, should_serialize_deps)
            }) {
                Ok(handle) => handle.join().unwrap_or(Err(BuildError::Crashed)),
                Err(_) => Err(BuildError::Crashed),
            }
        })
    }

    fn build_on_worker(
        &self,
        out_path: &Path,
        should_serialize_deps: bool,
    ) -> Result<Vec<u8>, BuildError> {
        // The cache directory may not exist yet on a cold start.
        if let Some(cache_dir) = self.module_cache_path {
            let _ = self.fs.create_dir_all(cache_dir);
        }

        let header =
            match extract_interface_header(self.fs, &self.ctx.interner, self.interface_path) {
                Ok(header) => header,
                Err(err) => {
                    self.diagnose_header_error(&err);
                    return Err(BuildError::Failed);
                }
            };

        // Anything with the same major version is assumed rebuildable;
        // minor bumps mark compatible field additions.
        if header.version.major != INTERFACE_FORMAT_VERSION.major {
            self.sink.emit(
                Diagnostic::error(
                    diag::UNSUPPORTED_INTERFACE_VERSION,
                    format!(
                        "module interface format version {} is not supported (expected {})",
                        header.version, INTERFACE_FORMAT_VERSION
                    ),
                )
                .with_file(self.interface_path),
            );
            return Err(BuildError::Failed);
        }

        let mut invocation = self.sub_invocation.clone();
        invocation.output_path = out_path.to_path_buf();

        let expected_module_name = invocation.module_name.clone();
        let args = self.ctx.interner.resolve_all(&header.args);
        if let Err(err) = invocation.parse_args(&args) {
            self.sink.emit(
                Diagnostic::error(diag::INTERFACE_FLAGS_PARSE_FAILED, err.to_string())
                    .with_file(self.interface_path),
            );
            return Err(BuildError::Failed);
        }

        if invocation.module_name != expected_module_name {
            let diagnostic = if invocation.debugger_support {
                Diagnostic::error(
                    diag::MODULE_NAME_MISMATCH_DEBUGGER,
                    format!(
                        "module `{}` was loaded under the name `{}`; \
                         the expression evaluator cannot rebuild it",
                        invocation.module_name, expected_module_name
                    ),
                )
            } else {
                Diagnostic::error(
                    diag::MODULE_NAME_MISMATCH,
                    format!(
                        "module interface declares name `{}` but `{}` was expected",
                        invocation.module_name, expected_module_name
                    ),
                )
            };
            self.sink.emit(diagnostic.with_file(self.interface_path));
            return Err(BuildError::Failed);
        }

        // Cached modules are always emitted optimized. Set after argument
        // parsing so the flags line cannot override it.
        invocation.optimization = OptimizationMode::Speed;

        let child_deps = DependencyCollector::new(invocation.track_system_dependencies);
        let payload = self
            .compiler
            .compile_interface(&invocation, self.sink, &child_deps)
            .map_err(|_| BuildError::Failed)?;

        let deps = self.collect_deps_for_serialization(&invocation, &child_deps)?;

        let module_header = ModuleHeader::new(
            &self.ctx.compiler_version,
            &invocation.module_name,
            if should_serialize_deps {
                deps
            } else {
                Vec::new()
            },
        );
        match write_module(self.fs, out_path, &module_header, &payload) {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                self.sink.emit(
                    Diagnostic::error(diag::CANNOT_WRITE_MODULE, err.to_string())
                        .with_file(out_path),
                );
                Err(BuildError::Failed)
            }
        }
    }

    /// Turns the child tracker's raw path set into the manifest to embed.
    ///
    /// SDK paths are stored relative to the SDK root. A dependency that is
    /// itself a cached module is replaced by its own embedded dependencies,
    /// which are already one level flat, so no manifest ever nests and the
    /// caches stay relocatable. Paths are deduplicated across all sources.
    fn collect_deps_for_serialization(
        &self,
        invocation: &SubInvocation,
        child_deps: &DependencyCollector,
    ) -> Result<Vec<FileDependency>, BuildError> {
        let sdk_path = invocation.sdk();
        let hash_based = invocation.serialize_dependency_hashes;

        let mut initial = child_deps.paths();
        initial.push(self.interface_path.to_path_buf());

        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut deps = Vec::new();

        for dep_path in &initial {
            if !seen.insert(dep_path.clone()) {
                continue;
            }

            let (stored_path, sdk_relative) = split_sdk_prefix(dep_path, sdk_path);
            if let Some(tracker) = self.tracker {
                tracker.add_dependency(dep_path, sdk_relative);
            }

            let mut dep_buf = LazyFileBuffer::new(self.fs, dep_path);

            if self.is_cached_module(invocation, dep_path) {
                let Some(buf) = dep_buf.get() else {
                    self.diagnose_missing_dependency(dep_path);
                    return Err(BuildError::Failed);
                };
                let info = validate_module(buf);
                if info.status != ModuleStatus::Valid {
                    self.sink.emit(
                        Diagnostic::error(
                            diag::CANNOT_EXTRACT_CACHED_MODULE_DEPENDENCIES,
                            format!(
                                "cannot extract dependencies from cached module `{}`",
                                dep_path.display()
                            ),
                        )
                        .with_file(self.interface_path),
                    );
                    return Err(BuildError::Failed);
                }
                for sub_dep in info.dependencies {
                    if seen.insert(sub_dep.path.clone()) {
                        if let Some(tracker) = self.tracker {
                            tracker.add_dependency(
                                &sub_dep.resolved_path(sdk_path),
                                sub_dep.sdk_relative,
                            );
                        }
                        deps.push(sub_dep);
                    }
                }
                continue;
            }

            let Ok(status) = self.fs.status(dep_path) else {
                self.diagnose_missing_dependency(dep_path);
                return Err(BuildError::Failed);
            };

            if hash_based {
                let Some(buf) = dep_buf.get() else {
                    self.diagnose_missing_dependency(dep_path);
                    return Err(BuildError::Failed);
                };
                deps.push(FileDependency::hash_based(
                    stored_path,
                    sdk_relative,
                    status.size,
                    ContentHash::from_bytes(buf),
                ));
            } else {
                deps.push(FileDependency::mod_time_based(
                    stored_path,
                    sdk_relative,
                    status.size,
                    status.mtime_ns,
                ));
            }
        }

        Ok(deps)
    }

    /// Whether `path` names a module in either consulted cache.
    fn is_cached_module(&self, invocation: &SubInvocation, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(MODULE_EXTENSION) {
            return false;
        }
        let in_dir = |dir: Option<&PathBuf>| dir.is_some_and(|d| path.starts_with(d));
        in_dir(invocation.module_cache_path.as_ref())
            || in_dir(invocation.prebuilt_module_cache_path.as_ref())
    }

    fn diagnose_header_error(&self, err: &InterfaceHeaderError) {
        let diagnostic = match err {
            InterfaceHeaderError::Open(io_err) => Diagnostic::error(
                diag::CANNOT_OPEN_INTERFACE,
                format!("cannot open module interface: {io_err}"),
            ),
            InterfaceHeaderError::MissingVersion | InterfaceHeaderError::InvalidVersion(_) => {
                Diagnostic::error(diag::INTERFACE_MISSING_FORMAT_VERSION, err.to_string())
            }
            InterfaceHeaderError::MissingFlags => {
                Diagnostic::error(diag::INTERFACE_MISSING_MODULE_FLAGS, err.to_string())
            }
        };
        self.sink.emit(diagnostic.with_file(self.interface_path));
    }

    fn diagnose_missing_dependency(&self, dep_path: &Path) {
        self.sink.emit(
            Diagnostic::error(
                diag::MISSING_INTERFACE_DEPENDENCY,
                format!(
                    "dependency `{}` of the module interface cannot be read",
                    dep_path.display()
                ),
            )
            .with_file(self.interface_path),
        );
    }
}

/// Splits the SDK prefix off `path` when it lies under the SDK root.
///
/// Returns the path to store and whether it is SDK-relative. An SDK of `/`
/// (or shorter) never matches; that would make every dependency relative.
fn split_sdk_prefix(path: &Path, sdk_path: Option<&Path>) -> (PathBuf, bool) {
    if let Some(sdk) = sdk_path {
        if sdk.as_os_str().len() > 1 {
            if let Ok(stripped) = path.strip_prefix(sdk) {
                if !stripped.as_os_str().is_empty() {
                    return (stripped.to_path_buf(), true);
                }
            }
        }
    }
    (path.to_path_buf(), false)
}
