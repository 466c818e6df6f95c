//! Dependency tracking for build-system integration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The ambient dependency tracker the host build system attaches to a
/// compilation session.
///
/// The loader reports every file it consults, as it is seen and never
/// batched, so an observer holds a superset of the final manifest even when
/// the resolve fails. Implementations must be `Sync`; the sub-build worker
/// thread reports through the same tracker.
pub trait DependencyTracker: Sync {
    /// Records that `path` was consulted. `is_system` is set for
    /// dependencies that live under the active SDK.
    fn add_dependency(&self, path: &Path, is_system: bool);

    /// Whether system (SDK) dependencies should be tracked at all.
    fn tracks_system_dependencies(&self) -> bool {
        false
    }
}

/// One entry recorded by a [`DependencyCollector`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrackedDependency {
    /// The consulted path, as reported.
    pub path: PathBuf,
    /// Whether the path was reported as a system dependency.
    pub is_system: bool,
}

/// A deduplicating, order-preserving [`DependencyTracker`].
///
/// Used as the child tracker of every sub-build, and convenient as a
/// top-level tracker in tests and simple drivers.
pub struct DependencyCollector {
    track_system: bool,
    state: Mutex<CollectorState>,
}

#[derive(Default)]
struct CollectorState {
    seen: HashSet<PathBuf>,
    entries: Vec<TrackedDependency>,
}

impl DependencyCollector {
    /// Creates a collector. `track_system` controls the answer to
    /// [`DependencyTracker::tracks_system_dependencies`].
    pub fn new(track_system: bool) -> Self {
        Self {
            track_system,
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Returns the recorded entries in first-seen order.
    pub fn entries(&self) -> Vec<TrackedDependency> {
        self.state.lock().unwrap().entries.clone()
    }

    /// Returns just the recorded paths in first-seen order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|e| e.path.clone())
            .collect()
    }
}

impl DependencyTracker for DependencyCollector {
    fn add_dependency(&self, path: &Path, is_system: bool) {
        let mut state = self.state.lock().unwrap();
        if state.seen.insert(path.to_path_buf()) {
            state.entries.push(TrackedDependency {
                path: path.to_path_buf(),
                is_system,
            });
        }
    }

    fn tracks_system_dependencies(&self) -> bool {
        self.track_system
    }
}
