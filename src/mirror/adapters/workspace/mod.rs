//! Capability-confined local workspace adapter.

use crate::mirror::{
    domain::relative_to_base,
    ports::{RemovalOutcome, WorkspaceCleaner, WorkspaceError},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use tracing::debug;

/// Removes checkout directories through a directory handle on the base.
///
/// Paths are resolved relative to the base handle, so neither `..` nor
/// symbolic links can reach outside the managed tree. Symbolic links at the
/// candidate path are reported as [`RemovalOutcome::NotADirectory`].
#[derive(Debug, Clone)]
pub struct CapStdWorkspace {
    base_dir: Utf8PathBuf,
}

impl CapStdWorkspace {
    /// Creates a cleaner rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl WorkspaceCleaner for CapStdWorkspace {
    fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    fn remove_directory(&self, path: &Utf8Path) -> Result<RemovalOutcome, WorkspaceError> {
        let Some(relative) = relative_to_base(&self.base_dir, path) else {
            return Ok(RemovalOutcome::OutsideBase);
        };

        let base = match Dir::open_ambient_dir(&self.base_dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RemovalOutcome::Missing),
            Err(err) => return Err(WorkspaceError::new(path, err)),
        };

        let metadata = match base.symlink_metadata(&relative) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RemovalOutcome::Missing),
            Err(err) => return Err(WorkspaceError::new(path, err)),
        };
        if !metadata.is_dir() {
            return Ok(RemovalOutcome::NotADirectory);
        }

        base.remove_dir_all(&relative)
            .map_err(|err| WorkspaceError::new(path, err))?;
        debug!(path = %path, "removed local checkout");
        Ok(RemovalOutcome::Removed(path.to_path_buf()))
    }
}
