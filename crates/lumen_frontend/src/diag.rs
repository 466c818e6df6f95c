//! Diagnostic catalog for the module-interface loader.

use lumen_diagnostics::{Category, DiagnosticCode};

/// The module interface could not be opened.
pub const CANNOT_OPEN_INTERFACE: DiagnosticCode = DiagnosticCode::new(Category::Error, 401);

/// The interface is missing its format-version header line.
pub const INTERFACE_MISSING_FORMAT_VERSION: DiagnosticCode =
    DiagnosticCode::new(Category::Error, 402);

/// The interface is missing its module-flags header line.
pub const INTERFACE_MISSING_MODULE_FLAGS: DiagnosticCode =
    DiagnosticCode::new(Category::Error, 403);

/// The interface was produced in an incompatible format version.
pub const UNSUPPORTED_INTERFACE_VERSION: DiagnosticCode =
    DiagnosticCode::new(Category::Error, 404);

/// The flags line of the interface did not parse as a sub-invocation.
pub const INTERFACE_FLAGS_PARSE_FAILED: DiagnosticCode =
    DiagnosticCode::new(Category::Error, 405);

/// The module name in the interface flags disagrees with the expected name.
pub const MODULE_NAME_MISMATCH: DiagnosticCode = DiagnosticCode::new(Category::Module, 101);

/// Name-mismatch variant worded for debugger and expression-evaluator
/// sessions.
pub const MODULE_NAME_MISMATCH_DEBUGGER: DiagnosticCode =
    DiagnosticCode::new(Category::Module, 102);

/// A dependency recorded during an interface build could not be read.
pub const MISSING_INTERFACE_DEPENDENCY: DiagnosticCode =
    DiagnosticCode::new(Category::Module, 103);

/// A cached module encountered while flattening dependencies is corrupt.
pub const CANNOT_EXTRACT_CACHED_MODULE_DEPENDENCIES: DiagnosticCode =
    DiagnosticCode::new(Category::Module, 104);

/// The freshly built module could not be written to the cache.
pub const CANNOT_WRITE_MODULE: DiagnosticCode = DiagnosticCode::new(Category::Module, 105);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let codes = [
            CANNOT_OPEN_INTERFACE,
            INTERFACE_MISSING_FORMAT_VERSION,
            INTERFACE_MISSING_MODULE_FLAGS,
            UNSUPPORTED_INTERFACE_VERSION,
            INTERFACE_FLAGS_PARSE_FAILED,
            MODULE_NAME_MISMATCH,
            MODULE_NAME_MISMATCH_DEBUGGER,
            MISSING_INTERFACE_DEPENDENCY,
            CANNOT_EXTRACT_CACHED_MODULE_DEPENDENCIES,
            CANNOT_WRITE_MODULE,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
