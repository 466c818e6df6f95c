//! Searching the storage tiers for an up-to-date module.
//!
//! Discovery walks three tiers in a fixed order: the writable cache entry
//! (which may be a real module or a forwarding record), the prebuilt cache
//! shipped with the toolchain, and a binary module sitting adjacent to the
//! interface. A load-mode policy decides which tiers are consulted.
//! Failures inside a tier are never fatal; the next tier is tried.

use std::io;
use std::path::{Path, PathBuf};

use lumen_common::Filesystem;
use lumen_serialization::{
    is_serialized_module, validate_module, FileDependency, ModuleStatus, MODULE_EXTENSION,
};

use crate::dep_verify::DependencyValidator;
use crate::forwarding::ForwardingModule;
use crate::tracker::DependencyTracker;

/// Policy selecting which storage tiers a resolve may consult.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LoadMode {
    /// Skip every tier and always rebuild from the interface.
    OnlyInterface,
    /// Skip the adjacent module but use the caches.
    PreferInterface,
    /// Consult all tiers in order.
    #[default]
    PreferSerialized,
    /// Serialized modules only. The interface loader must not be
    /// constructed in this mode; see [`InterfaceModuleLoader::new`].
    ///
    /// [`InterfaceModuleLoader::new`]: crate::loader::InterfaceModuleLoader::new
    OnlySerialized,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Kind {
    Normal,
    Prebuilt,
    Forwarded,
}

/// The module a discovery walk settled on.
///
/// Carries the path of the serialized module on disk and its loaded bytes.
/// Callers branch on the kind to decide whether a forwarding record should
/// be installed.
#[derive(Debug)]
pub struct DiscoveredModule {
    kind: Kind,
    /// Path of the serialized module on disk.
    pub path: PathBuf,
    /// The module's loaded contents.
    pub buffer: Vec<u8>,
}

impl DiscoveredModule {
    fn new(kind: Kind, path: PathBuf, buffer: Vec<u8>) -> Self {
        Self { kind, path, buffer }
    }

    /// A module found in the writable cache.
    pub fn normal(path: impl Into<PathBuf>, buffer: Vec<u8>) -> Self {
        Self::new(Kind::Normal, path.into(), buffer)
    }

    /// A module found in the prebuilt cache via its embedded manifest.
    pub fn prebuilt(path: impl Into<PathBuf>, buffer: Vec<u8>) -> Self {
        Self::new(Kind::Prebuilt, path.into(), buffer)
    }

    /// A prebuilt module reached through a forwarding record.
    pub fn forwarded(path: impl Into<PathBuf>, buffer: Vec<u8>) -> Self {
        Self::new(Kind::Forwarded, path.into(), buffer)
    }

    /// Whether this module came from the writable cache.
    pub fn is_normal(&self) -> bool {
        self.kind == Kind::Normal
    }

    /// Whether this module came from the prebuilt cache directly.
    pub fn is_prebuilt(&self) -> bool {
        self.kind == Kind::Prebuilt
    }

    /// Whether this module was reached through a forwarding record.
    pub fn is_forwarded(&self) -> bool {
        self.kind == Kind::Forwarded
    }
}

/// Non-fatal outcomes of a discovery walk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum DiscoveryError {
    /// No tier produced a usable module; the caller should build one.
    NotFound,
    /// An adjacent module exists; the caller should abandon this resolve
    /// and let the serialized-module loader handle it.
    Delegate,
}

/// One discovery walk over the storage tiers.
pub(crate) struct ModuleDiscovery<'a> {
    pub fs: &'a dyn Filesystem,
    pub sdk_path: Option<&'a Path>,
    pub module_name: &'a str,
    /// The adjacent module path the loader chain asked about.
    pub module_path: &'a Path,
    pub interface_path: &'a Path,
    pub prebuilt_cache_dir: Option<&'a Path>,
    pub load_mode: LoadMode,
    pub tracker: Option<&'a dyn DependencyTracker>,
}

impl<'a> ModuleDiscovery<'a> {
    /// Runs the tiered search. On success, returns the module and the
    /// dependency set that proved it fresh (used to seed a forwarding
    /// record after a prebuilt hit).
    pub(crate) fn discover(
        &self,
        cached_output_path: &Path,
    ) -> Result<(DiscoveredModule, Vec<FileDependency>), DiscoveryError> {
        let mut load_adjacent_module = true;
        match self.load_mode {
            LoadMode::OnlyInterface => return Err(DiscoveryError::NotFound),
            LoadMode::PreferInterface => load_adjacent_module = false,
            LoadMode::PreferSerialized => {}
            LoadMode::OnlySerialized => {
                unreachable!("interface loader is never constructed in OnlySerialized mode")
            }
        }

        // Whatever sits in the writable cache is the freshest knowledge we
        // have about this module.
        if let Ok(buf) = self.fs.read(cached_output_path) {
            if is_serialized_module(&buf) {
                if let Some(deps) = self.serialized_buffer_is_up_to_date(&buf) {
                    return Ok((DiscoveredModule::normal(cached_output_path, buf), deps));
                }
            } else if let Ok(fwd) = ForwardingModule::load(&buf) {
                if let Some((module_buf, deps)) = self.forwarding_module_is_up_to_date(&fwd) {
                    return Ok((
                        DiscoveredModule::forwarded(fwd.underlying_module_path, module_buf),
                        deps,
                    ));
                }
            }
        }

        if self.prebuilt_cache_dir.is_some() {
            if let Some(path) = self.compute_prebuilt_module_path() {
                if let Some((buf, deps)) = self.module_is_up_to_date(&path) {
                    return Ok((DiscoveredModule::prebuilt(path, buf), deps));
                }
            }
        }

        // If a module sits adjacent to the interface, bail out so the
        // serialized-module loader takes over. That loader either loads it
        // or owns the diagnostic for it, so existence alone decides; the
        // validation below only feeds the dependency tracker.
        if load_adjacent_module {
            match self.fs.read(self.module_path) {
                Ok(buf) => {
                    let _ = self.serialized_buffer_is_up_to_date(&buf);
                    return Err(DiscoveryError::Delegate);
                }
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    return Err(DiscoveryError::Delegate)
                }
                Err(_) => {}
            }
        }

        Err(DiscoveryError::NotFound)
    }

    fn validator(&self) -> DependencyValidator<'_> {
        DependencyValidator::new(self.fs, self.sdk_path, self.tracker)
    }

    /// Structurally validates a module buffer, then checks its embedded
    /// dependencies. Returns the dependencies when everything is fresh.
    fn serialized_buffer_is_up_to_date(&self, buf: &[u8]) -> Option<Vec<FileDependency>> {
        let info = validate_module(buf);
        if info.status != ModuleStatus::Valid {
            return None;
        }
        self.validator()
            .dependencies_are_up_to_date(&info.dependencies)
            .then_some(info.dependencies)
    }

    /// Reads and validates the module at `path`.
    fn module_is_up_to_date(&self, path: &Path) -> Option<(Vec<u8>, Vec<FileDependency>)> {
        let buf = self.fs.read(path).ok()?;
        let deps = self.serialized_buffer_is_up_to_date(&buf)?;
        Some((buf, deps))
    }

    /// Checks a forwarding record: the underlying module must exist and
    /// look structurally sound, and the record's own dependency list must
    /// be fresh. A missing underlying module reads as an absent entry, not
    /// an error.
    fn forwarding_module_is_up_to_date(
        &self,
        fwd: &ForwardingModule,
    ) -> Option<(Vec<u8>, Vec<FileDependency>)> {
        let module_buf = self.fs.read(&fwd.underlying_module_path).ok()?;
        if validate_module(&module_buf).status != ModuleStatus::Valid {
            return None;
        }

        // Forwarding records expand SDK-relative paths when written, so
        // every dependency here is absolute and mtime-verified.
        let deps: Vec<FileDependency> = fwd
            .dependencies
            .iter()
            .map(|d| FileDependency::mod_time_based(&d.path, false, d.size, d.mtime))
            .collect();

        self.validator()
            .dependencies_are_up_to_date(&deps)
            .then_some((module_buf, deps))
    }

    /// Computes where the prebuilt cache would keep this module, or `None`
    /// when the interface does not come from the SDK.
    ///
    /// The candidate is `<prebuilt>/<module filename>`, or
    /// `<prebuilt>/<Name>.lumenmodule/<module filename>` when the
    /// interface's parent directory follows the module-directory naming
    /// convention. There is no cache key in these paths.
    fn compute_prebuilt_module_path(&self) -> Option<PathBuf> {
        let sdk = self.sdk_path?;
        if sdk.as_os_str().is_empty() || !self.interface_path.starts_with(sdk) {
            return None;
        }

        let mut path = self.prebuilt_cache_dir?.to_path_buf();
        if let Some(parent_name) = self.interface_path.parent().and_then(|p| p.file_name()) {
            let parent = Path::new(parent_name);
            if parent.extension().and_then(|e| e.to_str()) == Some(MODULE_EXTENSION) {
                debug_assert_eq!(
                    parent.file_stem().and_then(|s| s.to_str()),
                    Some(self.module_name),
                );
                path.push(parent_name);
            }
        }
        path.push(self.module_path.file_name()?);
        Some(path)
    }
}
