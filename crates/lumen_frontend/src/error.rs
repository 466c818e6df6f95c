//! Error types surfaced by the module-interface loader.

/// The outcome codes of a module-files lookup, mirroring the contract of
/// the loader chain.
///
/// Only `InvalidArgument` represents a hard failure; the other two direct
/// the caller to a different loader.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ModuleLoadError {
    /// No module interface is present in the searched directory. The caller
    /// should try the next loader in the chain. No diagnostic is emitted.
    #[error("no module interface found in the searched directory")]
    NoSuchFile,

    /// A usable binary module sits adjacent to the interface, or a cache
    /// entry could not be installed. The caller should delegate to the
    /// serialized-module loader, which will load or diagnose it.
    #[error("a serialized module should be loaded instead of the interface")]
    NotSupported,

    /// Building the module from its interface was attempted and failed.
    /// Details have been reported through the diagnostic sink.
    #[error("building the module from its interface failed")]
    InvalidArgument,
}

/// Failure modes of a sub-build.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum BuildError {
    /// A stage of the sub-build reported errors. Diagnostics carry the
    /// details; no cache entry was written.
    #[error("the interface sub-build reported errors")]
    Failed,

    /// The sub-build worker crashed. The host survives, the resolve fails,
    /// and no cache entry is written.
    #[error("the interface sub-build crashed")]
    Crashed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        assert!(ModuleLoadError::NoSuchFile.to_string().contains("no module interface"));
        assert!(ModuleLoadError::NotSupported.to_string().contains("serialized module"));
        assert!(ModuleLoadError::InvalidArgument.to_string().contains("failed"));
    }

    #[test]
    fn build_error_display() {
        assert!(BuildError::Failed.to_string().contains("reported errors"));
        assert!(BuildError::Crashed.to_string().contains("crashed"));
    }
}
