//! Structured diagnostic messages with severity, codes, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured diagnostic message.
///
/// Each diagnostic includes a severity level, a unique code, a primary
/// message, and optionally the path of the file it concerns plus
/// explanatory notes and actionable help text. The module-loading
/// subsystems diagnose whole files rather than source ranges, so the
/// location is a path, not a span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The file this diagnostic is about, when one applies.
    pub file: Option<PathBuf>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            file: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            file: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Attaches the file this diagnostic is about.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 404);
        let diag = Diagnostic::error(code, "cannot open module interface");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "cannot open module interface");
        assert_eq!(format!("{}", diag.code), "E404");
        assert!(diag.file.is_none());
    }

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Warning, 201);
        let diag = Diagnostic::warning(code, "stale cache entry");
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Module, 112);
        let diag = Diagnostic::error(code, "module name mismatch")
            .with_file("/sdk/lib/Core.lumeninterface")
            .with_note("the flags line names a different module")
            .with_help("regenerate the interface");
        assert_eq!(
            diag.file.as_deref(),
            Some(std::path::Path::new("/sdk/lib/Core.lumeninterface"))
        );
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Error, 401);
        let diag = Diagnostic::error(code, "boom").with_file("/tmp/x");
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "boom");
        assert_eq!(back.code, code);
    }
}
