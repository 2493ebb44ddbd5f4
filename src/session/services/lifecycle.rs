//! Work session lifecycle orchestration.

use super::SessionSummaryCache;
use crate::mirror::{
    domain::{BranchName, MirrorDomainError, RepositoryId},
    ports::{BranchStore, MirrorStoreError, RepositoryStore},
};
use crate::session::{
    domain::{Session, SessionDomainError, SessionId, SessionSummary, WorkspaceState},
    ports::{SessionStart, SessionStore, SessionStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionRequest {
    repository_id: RepositoryId,
    branch: Option<String>,
    notes: String,
}

impl StartSessionRequest {
    /// Creates a request for a session on `repository_id`.
    #[must_use]
    pub const fn new(repository_id: RepositoryId) -> Self {
        Self {
            repository_id,
            branch: None,
            notes: String::new(),
        }
    }

    /// Pins the session to an existing branch of the repository.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the opening notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Service-level errors for session operations.
#[derive(Debug, Error)]
pub enum SessionLifecycleError {
    /// The repository does not exist.
    #[error("repository not found: {0}")]
    RepositoryNotFound(RepositoryId),

    /// The branch does not exist on the repository.
    #[error("branch '{name}' not found on repository {repository_id}")]
    BranchNotFound {
        /// Repository searched.
        repository_id: RepositoryId,
        /// Requested branch name.
        name: BranchName,
    },

    /// The session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The branch name is invalid.
    #[error(transparent)]
    InvalidBranch(#[from] MirrorDomainError),

    /// The state transition is not allowed.
    #[error(transparent)]
    Domain(#[from] SessionDomainError),

    /// A session store operation failed.
    #[error(transparent)]
    Sessions(#[from] SessionStoreError),

    /// A repository or branch lookup failed.
    #[error(transparent)]
    Mirror(#[from] MirrorStoreError),
}

/// Result type for session lifecycle operations.
pub type SessionLifecycleResult<T> = Result<T, SessionLifecycleError>;

/// Session lifecycle orchestration service.
#[derive(Clone)]
pub struct SessionLifecycleService<M, R, C>
where
    M: SessionStore,
    R: RepositoryStore + BranchStore,
    C: Clock + Send + Sync,
{
    sessions: Arc<M>,
    repositories: Arc<R>,
    summaries: Arc<SessionSummaryCache>,
    clock: Arc<C>,
}

impl<M, R, C> SessionLifecycleService<M, R, C>
where
    M: SessionStore,
    R: RepositoryStore + BranchStore,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(
        sessions: Arc<M>,
        repositories: Arc<R>,
        summaries: Arc<SessionSummaryCache>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            sessions,
            repositories,
            summaries,
            clock,
        }
    }

    /// Returns the summary cache shared with other mutation sites.
    #[must_use]
    pub const fn summaries(&self) -> &Arc<SessionSummaryCache> {
        &self.summaries
    }

    /// Starts a session, closing the repository's previous active one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::RepositoryNotFound`] or
    /// [`SessionLifecycleError::BranchNotFound`] for unknown targets, or a
    /// store error when the atomic start fails.
    pub async fn start(
        &self,
        request: StartSessionRequest,
    ) -> SessionLifecycleResult<SessionStart> {
        let StartSessionRequest {
            repository_id,
            branch,
            notes,
        } = request;

        self.repositories
            .find_repository(repository_id)
            .await?
            .ok_or(SessionLifecycleError::RepositoryNotFound(repository_id))?;

        let branch_id = match branch {
            Some(raw) => {
                let name = BranchName::new(raw)?;
                let found = self.repositories.find_branch(repository_id, &name).await?;
                let branch = found.ok_or(SessionLifecycleError::BranchNotFound {
                    repository_id,
                    name,
                })?;
                Some(branch.id())
            }
            None => None,
        };

        let session = Session::start(repository_id, branch_id, notes, &*self.clock);
        let started = self.sessions.start_session(&session).await?;
        self.summaries.invalidate(repository_id);
        info!(
            session = %started.session.id(),
            repository = %repository_id,
            superseded = started.superseded,
            "started session"
        );
        Ok(started)
    }

    /// Replaces the workspace state of an active session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::SessionNotFound`] or
    /// [`SessionDomainError::NotActive`] wrapped in
    /// [`SessionLifecycleError::Domain`].
    pub async fn record_workspace(
        &self,
        id: SessionId,
        workspace: WorkspaceState,
    ) -> SessionLifecycleResult<Session> {
        self.mutate(id, |session| session.record_workspace(workspace))
            .await
    }

    /// Replaces the notes of an active session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::SessionNotFound`] or
    /// [`SessionDomainError::NotActive`] wrapped in
    /// [`SessionLifecycleError::Domain`].
    pub async fn update_notes(
        &self,
        id: SessionId,
        notes: impl Into<String> + Send,
    ) -> SessionLifecycleResult<Session> {
        self.mutate(id, |session| session.update_notes(notes)).await
    }

    /// Ends a session, appending closing notes when given.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::SessionNotFound`] or
    /// [`SessionDomainError::AlreadyEnded`] wrapped in
    /// [`SessionLifecycleError::Domain`].
    pub async fn end(
        &self,
        id: SessionId,
        closing_notes: Option<&str>,
    ) -> SessionLifecycleResult<Session> {
        let clock = Arc::clone(&self.clock);
        let ended = self
            .mutate(id, |session| session.end(closing_notes, &*clock))
            .await?;
        info!(session = %id, "ended session");
        Ok(ended)
    }

    /// Returns the active session and whether any session exists.
    ///
    /// Served from the cache when present, otherwise computed and cached.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::Sessions`] when the store lookup
    /// fails.
    pub async fn summary(
        &self,
        repository_id: RepositoryId,
    ) -> SessionLifecycleResult<SessionSummary> {
        if let Some(cached) = self.summaries.get(repository_id) {
            return Ok(cached);
        }

        let active = self.sessions.active_session(repository_id).await?;
        let has_sessions =
            active.is_some() || !self.sessions.list_sessions(repository_id).await?.is_empty();
        let summary = SessionSummary {
            active,
            has_sessions,
        };
        self.summaries.insert(repository_id, summary.clone());
        Ok(summary)
    }

    /// Lists a repository's sessions, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionLifecycleError::Sessions`] when the store lookup
    /// fails.
    pub async fn history(
        &self,
        repository_id: RepositoryId,
    ) -> SessionLifecycleResult<Vec<Session>> {
        Ok(self.sessions.list_sessions(repository_id).await?)
    }

    async fn mutate<F>(&self, id: SessionId, change: F) -> SessionLifecycleResult<Session>
    where
        F: FnOnce(&mut Session) -> Result<(), SessionDomainError> + Send,
    {
        let mut session = self
            .sessions
            .find_session(id)
            .await?
            .ok_or(SessionLifecycleError::SessionNotFound(id))?;
        change(&mut session)?;
        self.sessions.update_session(&session).await?;
        self.summaries.invalidate(session.repository_id());
        Ok(session)
    }
}
