//! The loader-chain entry point: find or build a module for an interface.

use std::path::{Path, PathBuf};

use lumen_common::Filesystem;
use lumen_diagnostics::DiagnosticSink;
use lumen_serialization::FileDependency;

use crate::builder::InterfaceBuilder;
use crate::cache_path::{cache_key, cached_output_path};
use crate::compiler::SubCompiler;
use crate::context::ResolveContext;
use crate::discovery::{DiscoveredModule, DiscoveryError, LoadMode, ModuleDiscovery};
use crate::error::{BuildError, ModuleLoadError};
use crate::forwarding::{ForwardingError, ForwardingModule};
use crate::interface::INTERFACE_EXTENSION;
use crate::tracker::DependencyTracker;

/// The buffers a successful lookup hands back to the loader chain.
#[derive(Debug)]
pub struct LoadedModuleFiles {
    /// The serialized module, bit-identical to the cache entry backing it.
    pub module: Vec<u8>,
    /// The module documentation file found beside the interface, if any.
    /// A missing doc file is not an error.
    pub module_doc: Option<Vec<u8>>,
}

/// Resolves module interfaces against the writable cache, the prebuilt
/// cache, and adjacent modules, building from the interface when no tier
/// yields an up-to-date artifact.
pub struct InterfaceModuleLoader<'a> {
    ctx: &'a ResolveContext,
    fs: &'a dyn Filesystem,
    sink: &'a DiagnosticSink,
    compiler: &'a dyn SubCompiler,
    cache_dir: PathBuf,
    prebuilt_cache_dir: Option<PathBuf>,
    tracker: Option<&'a dyn DependencyTracker>,
    load_mode: LoadMode,
}

impl<'a> InterfaceModuleLoader<'a> {
    /// Creates a loader writing into `cache_dir` and optionally consulting
    /// `prebuilt_cache_dir`.
    ///
    /// # Panics
    ///
    /// Panics when `load_mode` is [`LoadMode::OnlySerialized`]; a session
    /// restricted to serialized modules must not construct this loader.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &'a ResolveContext,
        fs: &'a dyn Filesystem,
        sink: &'a DiagnosticSink,
        compiler: &'a dyn SubCompiler,
        cache_dir: impl Into<PathBuf>,
        prebuilt_cache_dir: Option<PathBuf>,
        tracker: Option<&'a dyn DependencyTracker>,
        load_mode: LoadMode,
    ) -> Self {
        assert!(
            load_mode != LoadMode::OnlySerialized,
            "interface module loader constructed in OnlySerialized mode"
        );
        Self {
            ctx,
            fs,
            sink,
            compiler,
            cache_dir: cache_dir.into(),
            prebuilt_cache_dir,
            tracker,
            load_mode,
        }
    }

    /// Looks for a module named `module_name` in `dir`, keyed off the
    /// interface file matching `module_filename`.
    ///
    /// Returns [`ModuleLoadError::NoSuchFile`] when no interface is
    /// present, [`ModuleLoadError::NotSupported`] when a usable adjacent
    /// module should be loaded by the serialized-module loader instead,
    /// and [`ModuleLoadError::InvalidArgument`] when a build was attempted
    /// and failed. On success the adjacent module-doc file named
    /// `doc_filename` is also loaded when it exists.
    pub fn find_module_files_in_directory(
        &self,
        module_name: &str,
        dir: &Path,
        module_filename: &str,
        doc_filename: &str,
    ) -> Result<LoadedModuleFiles, ModuleLoadError> {
        let module_path = dir.join(module_filename);
        let interface_path = module_path.with_extension(INTERFACE_EXTENSION);
        if !self.fs.exists(&interface_path) {
            return Err(ModuleLoadError::NoSuchFile);
        }

        let module = self.find_or_build_loadable_module(module_name, &module_path, &interface_path)?;

        let module_doc = if doc_filename.is_empty() {
            None
        } else {
            let doc_path = dir.join(doc_filename);
            self.fs.read(&doc_path).ok()
        };

        Ok(LoadedModuleFiles { module, module_doc })
    }

    /// Runs one full resolve: key computation, tiered discovery, optional
    /// build, optional forwarding-record installation.
    fn find_or_build_loadable_module(
        &self,
        module_name: &str,
        module_path: &Path,
        interface_path: &Path,
    ) -> Result<Vec<u8>, ModuleLoadError> {
        // System dependencies are tracked when the attached tracker wants
        // them; without a tracker there is nobody to report them to.
        let track_system_dependencies = self
            .tracker
            .map(|t| t.tracks_system_dependencies())
            .unwrap_or(false);

        // Setting up the builder also snapshots the sub-invocation we need
        // for computing the cache key.
        let builder = InterfaceBuilder::new(
            self.ctx,
            self.fs,
            self.sink,
            self.compiler,
            interface_path,
            module_name,
            Some(&self.cache_dir),
            self.prebuilt_cache_dir.as_deref(),
            false,
            track_system_dependencies,
            self.tracker,
        );
        let invocation = builder.sub_invocation();

        let key = cache_key(
            &self.ctx.compiler_version,
            interface_path,
            invocation.target_arch(),
            invocation.sdk(),
            invocation.track_system_dependencies,
        );
        let cached_output_path = cached_output_path(&self.cache_dir, module_name, &key);

        let discovery = ModuleDiscovery {
            fs: self.fs,
            sdk_path: invocation.sdk(),
            module_name,
            module_path,
            interface_path,
            prebuilt_cache_dir: self.prebuilt_cache_dir.as_deref(),
            load_mode: self.load_mode,
            tracker: self.tracker,
        };

        match discovery.discover(&cached_output_path) {
            Ok((module, deps)) => {
                // A direct prebuilt hit is the moment to install a
                // forwarding record, so the next resolve validates
                // freshness without touching the prebuilt tree.
                if module.is_prebuilt()
                    && self
                        .write_forwarding_module(&module, &cached_output_path, &deps)
                        .is_err()
                {
                    return Err(ModuleLoadError::NotSupported);
                }
                Ok(module.buffer)
            }
            Err(DiscoveryError::Delegate) => Err(ModuleLoadError::NotSupported),
            Err(DiscoveryError::NotFound) => builder
                .build_module(&cached_output_path, true)
                .map_err(|_| ModuleLoadError::InvalidArgument),
        }
    }

    /// Materializes a forwarding record for a prebuilt hit.
    ///
    /// Dependencies are re-stated now and stored fully expanded, because
    /// the prebuilt manifest may use content hashes and SDK-relative paths
    /// that the forwarding format does not express. The underlying module
    /// itself becomes the record's first dependency.
    fn write_forwarding_module(
        &self,
        module: &DiscoveredModule,
        output_path: &Path,
        deps: &[FileDependency],
    ) -> Result<(), ForwardingError> {
        debug_assert!(module.is_prebuilt());
        let sdk_path = self.ctx.sdk_path.as_deref();

        let mut fwd = ForwardingModule::new(&module.path);
        let mut record = |path: PathBuf| -> Result<(), ForwardingError> {
            let status = self.fs.status(&path).map_err(|source| ForwardingError::Io {
                path: path.clone(),
                source,
            })?;
            fwd.add_dependency(path, status.size, status.mtime_ns);
            Ok(())
        };

        record(module.path.clone())?;
        for dep in deps {
            record(dep.resolved_path(sdk_path))?;
        }

        let yaml = fwd.to_yaml()?;
        self.fs
            .create_dir_all(&self.cache_dir)
            .map_err(|source| ForwardingError::Io {
                path: self.cache_dir.clone(),
                source,
            })?;
        self.fs
            .write_atomic(output_path, yaml.as_bytes())
            .map_err(|source| ForwardingError::Io {
                path: output_path.to_path_buf(),
                source,
            })
    }
}

/// Builds a single interface out of band, without consulting any cache
/// tier, writing the module to a caller-chosen output path.
#[allow(clippy::too_many_arguments)]
pub fn build_module_from_interface(
    ctx: &ResolveContext,
    fs: &dyn Filesystem,
    sink: &DiagnosticSink,
    compiler: &dyn SubCompiler,
    cache_dir: Option<&Path>,
    prebuilt_cache_dir: Option<&Path>,
    module_name: &str,
    interface_path: &Path,
    output_path: &Path,
    serialize_dependency_hashes: bool,
    track_system_dependencies: bool,
) -> Result<(), BuildError> {
    let builder = InterfaceBuilder::new(
        ctx,
        fs,
        sink,
        compiler,
        interface_path,
        module_name,
        cache_dir,
        prebuilt_cache_dir,
        serialize_dependency_hashes,
        track_system_dependencies,
        None,
    );
    builder.build_module(output_path, true).map(|_| ())
}
