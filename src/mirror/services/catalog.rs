//! Read-side queries over the local mirror.

use crate::mirror::{
    domain::{
        Branch, RemoteRepositoryDetails, Repository, RepositoryFilter, RepositoryId,
        RepositorySort,
    },
    ports::{BranchStore, MirrorStoreError, RemoteHost, RemoteHostError, RepositoryStore},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for catalog queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No repository has the requested identifier.
    #[error("repository not found: {0}")]
    NotFound(RepositoryId),
    /// No repository has the requested qualified name.
    #[error("repository not found: {0}")]
    NameNotFound(String),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] MirrorStoreError),
    /// The remote host rejected or failed a request.
    #[error(transparent)]
    Remote(#[from] RemoteHostError),
}

/// Result type for catalog queries.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A repository together with its branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDetail {
    /// The repository record.
    pub repository: Repository,
    /// Branches, default branch first, then by name.
    pub branches: Vec<Branch>,
}

/// Catalog query service.
#[derive(Clone)]
pub struct CatalogService<S, H>
where
    S: RepositoryStore + BranchStore,
    H: RemoteHost,
{
    store: Arc<S>,
    remote: Arc<H>,
}

impl<S, H> CatalogService<S, H>
where
    S: RepositoryStore + BranchStore,
    H: RemoteHost,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(store: Arc<S>, remote: Arc<H>) -> Self {
        Self { store, remote }
    }

    /// Lists every mirrored repository.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] when the store query fails.
    pub async fn list(&self, sort: RepositorySort) -> CatalogResult<Vec<Repository>> {
        Ok(self.store.list_repositories(sort).await?)
    }

    /// Lists mirrored repositories matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Store`] when the store query fails.
    pub async fn search(
        &self,
        filter: &RepositoryFilter,
        sort: RepositorySort,
    ) -> CatalogResult<Vec<Repository>> {
        Ok(self.store.search(filter, sort).await?)
    }

    /// Loads one repository by qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NameNotFound`] when no record matches.
    pub async fn find_by_full_name(&self, full_name: &str) -> CatalogResult<Repository> {
        self.store
            .find_by_full_name(full_name)
            .await?
            .ok_or_else(|| CatalogError::NameNotFound(full_name.to_owned()))
    }

    /// Loads a repository with its branches.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no record has the identifier.
    pub async fn detail(&self, id: RepositoryId) -> CatalogResult<RepositoryDetail> {
        let repository = self
            .store
            .find_repository(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        let branches = self.store.list_branches(id).await?;
        Ok(RepositoryDetail {
            repository,
            branches,
        })
    }

    /// Fetches live statistics for a mirrored repository.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when no record has the identifier
    /// or [`CatalogError::Remote`] when the remote request fails.
    pub async fn remote_details(&self, id: RepositoryId) -> CatalogResult<RemoteRepositoryDetails> {
        let repository = self
            .store
            .find_repository(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;
        Ok(self.remote.repository_details(repository.full_name()).await?)
    }
}
