//! Persistence ports for mirrored repositories and branches.

use crate::mirror::domain::{
    Branch, BranchName, RemoteRepositoryId, Repository, RepositoryFilter, RepositoryId,
    RepositorySort,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for mirror store operations.
pub type MirrorStoreResult<T> = Result<T, MirrorStoreError>;

/// Repository persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Inserts or updates a repository keyed by its remote identifier.
    ///
    /// When a record with the same remote identifier exists, every mirrored
    /// field is overwritten and the existing local identifier is kept.
    /// Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorStoreError`] when persistence fails.
    async fn upsert_repository(&self, candidate: &Repository) -> MirrorStoreResult<Repository>;

    /// Finds a repository by local identifier.
    async fn find_repository(&self, id: RepositoryId) -> MirrorStoreResult<Option<Repository>>;

    /// Finds a repository by remote identifier.
    async fn find_by_remote_id(
        &self,
        remote_id: RemoteRepositoryId,
    ) -> MirrorStoreResult<Option<Repository>>;

    /// Finds a repository by qualified name.
    async fn find_by_full_name(&self, full_name: &str) -> MirrorStoreResult<Option<Repository>>;

    /// Lists every repository in the given order.
    async fn list_repositories(&self, sort: RepositorySort) -> MirrorStoreResult<Vec<Repository>>;

    /// Lists repositories matching `filter` in the given order, without
    /// duplicates.
    async fn search(
        &self,
        filter: &RepositoryFilter,
        sort: RepositorySort,
    ) -> MirrorStoreResult<Vec<Repository>>;

    /// Deletes a repository together with its branches and sessions.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorStoreError::RepositoryNotFound`] when no record has
    /// the identifier.
    async fn delete_repository(&self, id: RepositoryId) -> MirrorStoreResult<()>;
}

/// Branch persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BranchStore: Send + Sync {
    /// Inserts or updates a branch keyed by `(repository, name)`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorStoreError::RepositoryNotFound`] when the owning
    /// repository does not exist.
    async fn upsert_branch(&self, candidate: &Branch) -> MirrorStoreResult<Branch>;

    /// Lists a repository's branches, default branch first, then by name.
    async fn list_branches(&self, repository_id: RepositoryId) -> MirrorStoreResult<Vec<Branch>>;

    /// Finds a branch of a repository by name.
    async fn find_branch(
        &self,
        repository_id: RepositoryId,
        name: &BranchName,
    ) -> MirrorStoreResult<Option<Branch>>;

    /// Deletes every branch of the repository whose name is not in `keep`.
    ///
    /// Sessions referencing a deleted branch lose their branch reference.
    /// Returns the number of deleted branches.
    async fn prune_branches(
        &self,
        repository_id: RepositoryId,
        keep: &[BranchName],
    ) -> MirrorStoreResult<usize>;
}

/// Errors returned by mirror store implementations.
#[derive(Debug, Clone, Error)]
pub enum MirrorStoreError {
    /// The repository was not found.
    #[error("repository not found: {0}")]
    RepositoryNotFound(RepositoryId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MirrorStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
