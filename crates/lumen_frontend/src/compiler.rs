//! The seam between the resolver and the rest of the compiler.

use lumen_diagnostics::DiagnosticSink;

use crate::invocation::SubInvocation;
use crate::tracker::DependencyCollector;

/// The child compilation reported errors.
///
/// Details live in the diagnostic sink the compilation was handed; this
/// type only signals that the pipeline did not produce a module.
#[derive(Clone, Copy, Debug, thiserror::Error)]
#[error("interface compilation did not produce a module")]
pub struct CompileFailed;

/// An opaque driver for compiling one module interface.
///
/// The build driver hands the implementation a fully configured
/// [`SubInvocation`] and expects it to run set-up, semantic analysis,
/// binary generation, and the optimizer for the invocation's input, in
/// that order, stopping at the first stage that reports errors. The
/// implementation must:
///
/// - record every file it reads into `dependencies` as it is opened,
/// - report problems to `sink` (warnings are suppressed per the
///   invocation),
/// - return the payload the serializer should embed in the module.
///
/// Serialization itself stays with the driver so the dependency manifest
/// can be flattened first. Implementations must be `Sync`: the driver runs
/// them on the crash-isolation worker thread.
pub trait SubCompiler: Sync {
    /// Compiles `invocation.input_path` and returns the module payload.
    fn compile_interface(
        &self,
        invocation: &SubInvocation,
        sink: &DiagnosticSink,
        dependencies: &DependencyCollector,
    ) -> Result<Vec<u8>, CompileFailed>;
}
