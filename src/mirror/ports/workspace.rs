//! Local workspace port for removing checkout directories.

use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Result of a single removal attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The directory tree was removed.
    Removed(Utf8PathBuf),
    /// Nothing exists at the path.
    Missing,
    /// The path exists but is not a directory.
    NotADirectory,
    /// The path lies outside the managed base directory.
    OutsideBase,
}

/// Directory removal confined to a managed base directory.
pub trait WorkspaceCleaner: Send + Sync {
    /// Returns the managed base directory.
    fn base_dir(&self) -> &Utf8Path;

    /// Recursively removes `path` when it is a directory inside the base.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError`] when the filesystem rejects the removal.
    fn remove_directory(&self, path: &Utf8Path) -> Result<RemovalOutcome, WorkspaceError>;
}

/// Errors returned by workspace adapters.
#[derive(Debug, Clone, Error)]
#[error("failed to remove {path}: {source}")]
pub struct WorkspaceError {
    /// Path whose removal failed.
    pub path: Utf8PathBuf,
    /// Underlying filesystem error.
    pub source: Arc<std::io::Error>,
}

impl WorkspaceError {
    /// Wraps a filesystem error for `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}
