//! Editor and working-tree state captured while a session is active.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cursor location inside the last accessed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// One-based line number.
    pub line: u32,
    /// One-based column number.
    pub column: u32,
}

impl CursorPosition {
    /// Creates a cursor position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Working-tree status reported by git.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitStatus {
    /// Checked-out branch, absent on a detached head.
    #[serde(default)]
    pub branch: Option<String>,
    /// Paths staged for commit.
    #[serde(default)]
    pub staged: Vec<String>,
    /// Paths modified but not staged.
    #[serde(default)]
    pub modified: Vec<String>,
    /// Untracked paths.
    #[serde(default)]
    pub untracked: Vec<String>,
}

impl GitStatus {
    /// Returns whether the working tree has no pending changes.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.modified.is_empty() && self.untracked.is_empty()
    }
}

/// Snapshot of the editor and working tree for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    /// Last file the user touched.
    #[serde(default)]
    pub last_file: Option<String>,
    /// Cursor location in `last_file`.
    #[serde(default)]
    pub cursor: Option<CursorPosition>,
    /// Files open in the editor, in tab order.
    #[serde(default)]
    pub open_files: Vec<String>,
    /// Environment variables captured at the time of recording.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Git working-tree status.
    #[serde(default)]
    pub git_status: Option<GitStatus>,
}
