use std::path::{Path, PathBuf};

/// Suppresses consecutive events for the same path.
///
/// Editors and screenshot tools often produce several write events for one
/// save; only the first one after a different path is dispatched.
#[derive(Debug, Default)]
pub struct PathDeduplicator {
    last: Option<PathBuf>,
}

impl PathDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `path` differs from the last dispatched path, and
    /// records it as dispatched.
    pub fn should_dispatch(&mut self, path: &Path) -> bool {
        if self.last.as_deref() == Some(path) {
            return false;
        }
        self.last = Some(path.to_path_buf());
        true
    }

    /// Last dispatched path.
    pub fn last(&self) -> Option<&Path> {
        self.last.as_deref()
    }
}
