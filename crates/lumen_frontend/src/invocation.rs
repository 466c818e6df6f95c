//! The configured options bundle handed to a sub-compilation.

use std::path::{Path, PathBuf};

/// What kind of input a sub-invocation compiles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputKind {
    /// Ordinary Lumen source.
    #[default]
    Source,
    /// A textual module interface.
    ModuleInterface,
}

/// Optimization setting for a sub-build.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OptimizationMode {
    /// No optimization.
    #[default]
    None,
    /// Optimize for execution speed. Cached modules are always emitted in
    /// this mode.
    Speed,
}

/// A snapshot of everything a child compilation of an interface needs.
///
/// A sub-invocation starts from host state (search paths, SDK, triple),
/// then replays the frozen argument vector from the interface's flags line
/// on top via [`parse_args`](Self::parse_args).
#[derive(Clone, Debug)]
pub struct SubInvocation {
    /// Name the produced module must have.
    pub module_name: String,
    /// The kind of the primary input.
    pub input_kind: InputKind,
    /// The interface file being compiled.
    pub input_path: PathBuf,
    /// Where the serialized module is written.
    pub output_path: PathBuf,
    /// Target triple for the child.
    pub target_triple: String,
    /// Active SDK root, if any.
    pub sdk_path: Option<PathBuf>,
    /// Module import search paths.
    pub import_search_paths: Vec<PathBuf>,
    /// Compiler runtime resource directory.
    pub runtime_resource_path: Option<PathBuf>,
    /// The writable module cache the child may consult.
    pub module_cache_path: Option<PathBuf>,
    /// The read-only prebuilt module cache the child may consult.
    pub prebuilt_module_cache_path: Option<PathBuf>,
    /// Whether dependencies under the SDK are tracked.
    pub track_system_dependencies: bool,
    /// Whether recorded dependencies are verified by content hash rather
    /// than modification time.
    pub serialize_dependency_hashes: bool,
    /// Warnings are suppressed in sub-builds; the user is in no position
    /// to fix the interface.
    pub suppress_warnings: bool,
    /// Inherited debugger-support mode. Softens certain diagnostics.
    pub debugger_support: bool,
    /// Inherited detailed foreign-import record mode.
    pub detailed_import_records: bool,
    /// Whether `@external` attributes require importing the runtime
    /// support module. Disabled in sub-builds: printed interfaces always
    /// spell these attributes out.
    pub extern_attr_requires_runtime: bool,
    /// Effective language version requested by the flags line.
    pub language_version: Option<String>,
    /// Whether the module is built for library evolution.
    pub library_evolution: bool,
    /// Optimization mode for the child.
    pub optimization: OptimizationMode,
}

/// Why a flags line failed to parse.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArgParseError {
    /// An option that takes a value appeared last.
    #[error("flag `{0}` expects a value")]
    MissingValue(String),

    /// An option this compiler does not recognize.
    #[error("unknown flag `{0}` in module flags")]
    UnknownFlag(String),
}

impl SubInvocation {
    /// Creates a sub-invocation for compiling `input_path` into a module
    /// named `module_name`. Host-derived fields start empty; the builder
    /// fills them in before argument parsing.
    pub fn new(module_name: impl Into<String>, input_path: impl Into<PathBuf>) -> Self {
        Self {
            module_name: module_name.into(),
            input_kind: InputKind::default(),
            input_path: input_path.into(),
            output_path: PathBuf::new(),
            target_triple: String::new(),
            sdk_path: None,
            import_search_paths: Vec::new(),
            runtime_resource_path: None,
            module_cache_path: None,
            prebuilt_module_cache_path: None,
            track_system_dependencies: false,
            serialize_dependency_hashes: false,
            suppress_warnings: false,
            debugger_support: false,
            detailed_import_records: false,
            extern_attr_requires_runtime: true,
            language_version: None,
            library_evolution: false,
            optimization: OptimizationMode::None,
        }
    }

    /// Replays a tokenized flags line on top of this invocation.
    ///
    /// Recognized flags overwrite the host-derived defaults, which is how
    /// an interface pins the target and module name it was printed for.
    pub fn parse_args(&mut self, args: &[String]) -> Result<(), ArgParseError> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value_of = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| ArgParseError::MissingValue(flag.to_string()))
            };
            match arg.as_str() {
                "-module-name" => self.module_name = value_of("-module-name")?,
                "-target" => self.target_triple = value_of("-target")?,
                "-sdk" => self.sdk_path = Some(PathBuf::from(value_of("-sdk")?)),
                "-I" => self
                    .import_search_paths
                    .push(PathBuf::from(value_of("-I")?)),
                "-resource-dir" => {
                    self.runtime_resource_path =
                        Some(PathBuf::from(value_of("-resource-dir")?))
                }
                "-language-version" => {
                    self.language_version = Some(value_of("-language-version")?)
                }
                "-enable-library-evolution" => self.library_evolution = true,
                other => return Err(ArgParseError::UnknownFlag(other.to_string())),
            }
        }
        Ok(())
    }

    /// The architecture component of the child's target triple.
    pub fn target_arch(&self) -> &str {
        self.target_triple.split('-').next().unwrap_or("")
    }

    /// The SDK root as a path, when one is set.
    pub fn sdk(&self) -> Option<&Path> {
        self.sdk_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_overrides_defaults() {
        let mut inv = SubInvocation::new("Core", "/sdk/Core.lumeninterface");
        inv.target_triple = "x86_64-unknown-linux".to_string();

        inv.parse_args(&args(&[
            "-target",
            "arm64-unknown-linux",
            "-module-name",
            "Core",
            "-enable-library-evolution",
        ]))
        .unwrap();

        assert_eq!(inv.target_triple, "arm64-unknown-linux");
        assert_eq!(inv.target_arch(), "arm64");
        assert!(inv.library_evolution);
    }

    #[test]
    fn parse_search_paths_accumulate() {
        let mut inv = SubInvocation::new("Core", "/x");
        inv.parse_args(&args(&["-I", "/a", "-I", "/b"])).unwrap();
        assert_eq!(
            inv.import_search_paths,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn parse_sdk_and_language_version() {
        let mut inv = SubInvocation::new("Core", "/x");
        inv.parse_args(&args(&["-sdk", "/sdks/v2", "-language-version", "5"]))
            .unwrap();
        assert_eq!(inv.sdk(), Some(Path::new("/sdks/v2")));
        assert_eq!(inv.language_version.as_deref(), Some("5"));
    }

    #[test]
    fn unknown_flag_rejected() {
        let mut inv = SubInvocation::new("Core", "/x");
        let err = inv.parse_args(&args(&["-frobnicate"])).unwrap_err();
        assert_eq!(err, ArgParseError::UnknownFlag("-frobnicate".to_string()));
    }

    #[test]
    fn missing_value_rejected() {
        let mut inv = SubInvocation::new("Core", "/x");
        let err = inv.parse_args(&args(&["-target"])).unwrap_err();
        assert_eq!(err, ArgParseError::MissingValue("-target".to_string()));
    }

    #[test]
    fn new_invocation_defaults() {
        let inv = SubInvocation::new("Core", "/x");
        assert_eq!(inv.input_kind, InputKind::Source);
        assert_eq!(inv.optimization, OptimizationMode::None);
        assert!(inv.extern_attr_requires_runtime);
        assert!(!inv.suppress_warnings);
    }
}
