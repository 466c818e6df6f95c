//! Diagnostic codes with category prefixes for structured error identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
///
/// Each category maps to a single-character prefix used in diagnostic code
/// display (e.g., `E401` for an error, `W203` for a warning).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
    /// Serialization and module-cache diagnostics, prefixed with `M`.
    Module,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub const fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Module => 'M',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric
/// identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit
/// number, e.g., `E401`, `W203`, `M112`. Codes are declared as constants by
/// the subsystems that emit them; `new` is `const` so catalogs can live in
/// `const` tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Error.prefix(), 'E');
        assert_eq!(Category::Warning.prefix(), 'W');
        assert_eq!(Category::Module.prefix(), 'M');
    }

    #[test]
    fn display_format() {
        let code = DiagnosticCode::new(Category::Error, 401);
        assert_eq!(format!("{code}"), "E401");

        let code = DiagnosticCode::new(Category::Warning, 3);
        assert_eq!(format!("{code}"), "W003");
    }

    #[test]
    fn usable_in_const_context() {
        const CODE: DiagnosticCode = DiagnosticCode::new(Category::Module, 101);
        assert_eq!(format!("{CODE}"), "M101");
    }

    #[test]
    fn equality() {
        let a = DiagnosticCode::new(Category::Error, 401);
        let b = DiagnosticCode::new(Category::Error, 401);
        let c = DiagnosticCode::new(Category::Error, 402);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Warning, 210);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
