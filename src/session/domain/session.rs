//! Work session aggregate.

use super::{SessionDomainError, SessionId, WorkspaceState};
use crate::mirror::domain::{BranchId, RepositoryId};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// A work interval on one repository, optionally pinned to a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    repository_id: RepositoryId,
    branch_id: Option<BranchId>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    active: bool,
    notes: String,
    workspace: WorkspaceState,
}

/// Parameter object for reconstructing a persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Persisted session identifier.
    pub id: SessionId,
    /// Owning repository.
    pub repository_id: RepositoryId,
    /// Referenced branch, cleared when the branch is deleted.
    pub branch_id: Option<BranchId>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// End timestamp.
    pub ended_at: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
    /// Free-form notes.
    pub notes: String,
    /// Captured workspace state.
    pub workspace: WorkspaceState,
}

impl Session {
    /// Starts a new active session.
    #[must_use]
    pub fn start(
        repository_id: RepositoryId,
        branch_id: Option<BranchId>,
        notes: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: SessionId::new(),
            repository_id,
            branch_id,
            started_at: clock.utc(),
            ended_at: None,
            active: true,
            notes: notes.into(),
            workspace: WorkspaceState::default(),
        }
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            id: data.id,
            repository_id: data.repository_id,
            branch_id: data.branch_id,
            started_at: data.started_at,
            ended_at: data.ended_at,
            active: data.active,
            notes: data.notes,
            workspace: data.workspace,
        }
    }

    /// Replaces the captured workspace state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::NotActive`] for inactive sessions.
    pub fn record_workspace(
        &mut self,
        workspace: WorkspaceState,
    ) -> Result<(), SessionDomainError> {
        self.ensure_active()?;
        self.workspace = workspace;
        Ok(())
    }

    /// Replaces the notes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::NotActive`] for inactive sessions.
    pub fn update_notes(&mut self, notes: impl Into<String>) -> Result<(), SessionDomainError> {
        self.ensure_active()?;
        self.notes = notes.into();
        Ok(())
    }

    /// Ends the session, appending `closing_notes` on a new line.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::AlreadyEnded`] when the session is no
    /// longer active.
    pub fn end(
        &mut self,
        closing_notes: Option<&str>,
        clock: &impl Clock,
    ) -> Result<(), SessionDomainError> {
        if !self.active {
            return Err(SessionDomainError::AlreadyEnded(self.id));
        }
        if let Some(extra) = closing_notes.map(str::trim).filter(|value| !value.is_empty()) {
            if !self.notes.is_empty() {
                self.notes.push('\n');
            }
            self.notes.push_str(extra);
        }
        self.close(clock.utc());
        Ok(())
    }

    /// Closes the session because a newer one started on the repository.
    pub fn supersede(&mut self, at: DateTime<Utc>) {
        if self.active {
            self.close(at);
        }
    }

    /// Drops the branch reference after the branch was deleted.
    pub const fn clear_branch(&mut self) {
        self.branch_id = None;
    }

    const fn close(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.ended_at = Some(at);
    }

    const fn ensure_active(&self) -> Result<(), SessionDomainError> {
        if self.active {
            Ok(())
        } else {
            Err(SessionDomainError::NotActive(self.id))
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the owning repository.
    #[must_use]
    pub const fn repository_id(&self) -> RepositoryId {
        self.repository_id
    }

    /// Returns the referenced branch.
    #[must_use]
    pub const fn branch_id(&self) -> Option<BranchId> {
        self.branch_id
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the end timestamp.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns whether the session is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the captured workspace state.
    #[must_use]
    pub const fn workspace(&self) -> &WorkspaceState {
        &self.workspace
    }
}

/// Per-repository session overview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// The active session, if any.
    pub active: Option<Session>,
    /// Whether the repository has ever had a session.
    pub has_sessions: bool,
}
