//! Session persistence port.

use crate::mirror::domain::RepositoryId;
use crate::session::domain::{Session, SessionId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for session store operations.
pub type SessionStoreResult<T> = Result<T, SessionStoreError>;

/// Outcome of an atomic session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    /// The newly stored active session.
    pub session: Session,
    /// Number of previously active sessions that were closed.
    pub superseded: usize,
}

/// Session persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Closes any active session of the repository and stores `session` as
    /// the active one, in a single atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::RepositoryNotFound`] when the owning
    /// repository does not exist.
    async fn start_session(&self, session: &Session) -> SessionStoreResult<SessionStart>;

    /// Persists changes to an existing session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::NotFound`] when the session does not
    /// exist.
    async fn update_session(&self, session: &Session) -> SessionStoreResult<()>;

    /// Finds a session by identifier.
    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>>;

    /// Returns the active session of a repository.
    async fn active_session(
        &self,
        repository_id: RepositoryId,
    ) -> SessionStoreResult<Option<Session>>;

    /// Lists a repository's sessions, most recent first.
    async fn list_sessions(&self, repository_id: RepositoryId) -> SessionStoreResult<Vec<Session>>;
}

/// Errors returned by session store implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// The session was not found.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The owning repository was not found.
    #[error("repository not found: {0}")]
    RepositoryNotFound(RepositoryId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
