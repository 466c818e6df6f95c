//! Interned strings for cheap cloning and O(1) equality comparison.

use lasso::ThreadedRodeo;

/// A handle to an interned string.
///
/// Idents are `u32` indices into an [`Interner`]. The module loaders intern
/// the argument vector extracted from an interface's flags line so the
/// tokens live for the duration of the resolve without per-token
/// allocations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Primarily intended for testing. In normal use, identifiers are
    /// created through [`Interner::get_or_intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32` which is always a valid `usize` on 32-bit
// and 64-bit platforms. `try_from_usize` rejects values that don't fit in
// `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
///
/// One interner is owned by the resolve context; module names, flag tokens,
/// and other short strings are interned through it so equality checks and
/// clones stay O(1).
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`]. If the string was already
    /// interned, returns the existing identifier without allocating.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Resolves a slice of [`Ident`]s into owned strings, in order.
    pub fn resolve_all(&self, idents: &[Ident]) -> Vec<String> {
        idents.iter().map(|&id| self.resolve(id).to_string()).collect()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("-module-name");
        assert_eq!(interner.resolve(id), "-module-name");
    }

    #[test]
    fn same_string_same_ident() {
        let interner = Interner::new();
        let a = interner.get_or_intern("Foundation");
        let b = interner.get_or_intern("Foundation");
        assert_eq!(a, b);
    }

    #[test]
    fn different_strings_differ() {
        let interner = Interner::new();
        let a = interner.get_or_intern("alpha");
        let b = interner.get_or_intern("beta");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_all_preserves_order() {
        let interner = Interner::new();
        let ids: Vec<Ident> = ["-target", "arm64-unknown-linux", "-module-name"]
            .iter()
            .map(|s| interner.get_or_intern(s))
            .collect();
        assert_eq!(
            interner.resolve_all(&ids),
            vec!["-target", "arm64-unknown-linux", "-module-name"]
        );
    }

    #[test]
    fn raw_conversion() {
        let id = Ident::from_raw(7);
        assert_eq!(id.as_raw(), 7);
    }
}
