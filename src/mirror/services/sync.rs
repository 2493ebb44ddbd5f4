//! Reconciliation of remote repository state into the local mirror.

use crate::mirror::{
    domain::{
        Affiliation, Branch, BranchName, ImportRequest, MirrorDomainError, NewRemoteRepository,
        RemoteBranch, RemoteRepository, Repository, RepositoryName, RepositorySnapshot, SyncScope,
        SyncSummary, dedup_by_key, repository_local_path,
    },
    ports::{BranchStore, MirrorStoreError, RemoteHost, RemoteHostError, RepositoryStore},
};
use crate::session::services::SessionSummaryCache;
use camino::Utf8PathBuf;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for synchronization operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] MirrorDomainError),
    /// The remote host rejected or failed a request.
    #[error(transparent)]
    Remote(#[from] RemoteHostError),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] MirrorStoreError),
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Repositories written by a sync or import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Repositories upserted and branch-synced, in remote listing order.
    pub repositories: Vec<Repository>,
    /// Counts over `repositories`.
    pub summary: SyncSummary,
}

impl SyncOutcome {
    fn new(repositories: Vec<Repository>) -> Self {
        let summary = SyncSummary::from_repositories(&repositories);
        Self {
            repositories,
            summary,
        }
    }
}

/// Branch-level counts for one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchSyncSummary {
    /// Branches inserted or updated.
    pub upserted: usize,
    /// Branches skipped after a failure.
    pub failed: usize,
    /// Local branches deleted because the remote no longer lists them.
    pub pruned: usize,
}

/// Request payload for creating a repository on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRepositoryRequest {
    name: String,
    description: Option<String>,
    private: bool,
    auto_init: bool,
}

impl CreateRepositoryRequest {
    /// Creates a request for a public repository with an initial commit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            private: false,
            auto_init: true,
        }
    }

    /// Sets the description; blank values are dropped.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let raw = description.into();
        self.description = (!raw.trim().is_empty()).then(|| raw.trim().to_owned());
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub const fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Sets whether the host creates an initial commit.
    #[must_use]
    pub const fn auto_init(mut self, auto_init: bool) -> Self {
        self.auto_init = auto_init;
        self
    }
}

/// Synchronization orchestration service.
#[derive(Clone)]
pub struct SyncService<S, H, C>
where
    S: RepositoryStore + BranchStore,
    H: RemoteHost,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    remote: Arc<H>,
    clock: Arc<C>,
    base_dir: Utf8PathBuf,
    summaries: Option<Arc<SessionSummaryCache>>,
}

impl<S, H, C> SyncService<S, H, C>
where
    S: RepositoryStore + BranchStore,
    H: RemoteHost,
    C: Clock + Send + Sync,
{
    /// Creates a new sync service writing local paths beneath `base_dir`.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        remote: Arc<H>,
        clock: Arc<C>,
        base_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            store,
            remote,
            clock,
            base_dir: base_dir.into(),
            summaries: None,
        }
    }

    /// Invalidates `summaries` for a repository whenever a prune detaches
    /// its sessions from removed branches.
    #[must_use]
    pub fn with_summary_cache(mut self, summaries: Arc<SessionSummaryCache>) -> Self {
        self.summaries = Some(summaries);
        self
    }

    /// Mirrors every repository in `scope` into the store.
    ///
    /// Remote listings are merged and de-duplicated by remote id. Each
    /// repository is upserted, then its branches are reconciled. A
    /// repository whose mapping, upsert, or branch sync fails is logged and
    /// left out of the result.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when a listing request fails, including
    /// rate limiting. Nothing after the failing listing is written.
    pub async fn sync(&self, scope: &SyncScope) -> SyncResult<SyncOutcome> {
        let records = self.fetch(scope).await?;
        let mut synced = Vec::with_capacity(records.len());

        for record in &records {
            let repository = match self.upsert_remote(record).await {
                Ok(repository) => repository,
                Err(err) => {
                    warn!(
                        remote_id = record.id,
                        repository = %record.qualified_name(),
                        error = %err,
                        "skipping repository"
                    );
                    continue;
                }
            };

            match self.sync_branches(&repository).await {
                Ok(_) => synced.push(repository),
                Err(err) => warn!(
                    repository = repository.full_name(),
                    error = %err,
                    "branch sync failed, skipping repository"
                ),
            }
        }

        let outcome = SyncOutcome::new(synced);
        info!(
            fetched = records.len(),
            total = outcome.summary.total,
            private = outcome.summary.private,
            organization = outcome.summary.organization,
            "repository sync finished"
        );
        Ok(outcome)
    }

    /// Reconciles the branches of one stored repository with the remote.
    ///
    /// Every listed branch is upserted; local branches that were not
    /// written, including ones whose upsert failed, are pruned.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the branch listing or the prune fails.
    pub async fn sync_branches(
        &self,
        repository: &Repository,
    ) -> SyncResult<BranchSyncSummary> {
        let remote_branches = self.remote.list_branches(repository.full_name()).await?;
        let mut summary = BranchSyncSummary::default();
        let mut seen: Vec<BranchName> = Vec::with_capacity(remote_branches.len());

        for remote in &remote_branches {
            match self.upsert_branch(repository, remote).await {
                Ok(branch) => {
                    summary.upserted += 1;
                    seen.push(branch.name().clone());
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(
                        repository = repository.full_name(),
                        branch = %remote.name,
                        error = %err,
                        "skipping branch"
                    );
                }
            }
        }

        summary.pruned = self.store.prune_branches(repository.id(), &seen).await?;
        if let Some(summaries) = self.summaries.as_ref().filter(|_| summary.pruned > 0) {
            summaries.invalidate(repository.id());
        }
        Ok(summary)
    }

    /// Runs a sync for the import form and keeps the repositories that pass
    /// its inclusion toggles.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] under the same conditions as [`Self::sync`], or
    /// when the token owner's login cannot be resolved.
    pub async fn import(&self, request: &ImportRequest) -> SyncResult<SyncOutcome> {
        let outcome = self.sync(&request.scope()).await?;
        let login = if request.include_collaborations {
            String::new()
        } else {
            self.remote.authenticated_login().await?
        };

        let kept: Vec<Repository> = outcome
            .repositories
            .into_iter()
            .filter(|repository| request.keeps(repository, &login))
            .collect();
        Ok(SyncOutcome::new(kept))
    }

    /// Creates a repository remotely and mirrors it locally.
    ///
    /// A branch sync failure after creation is logged; the repository is
    /// still returned.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Domain`] for an invalid name, or
    /// [`SyncError::Remote`]/[`SyncError::Store`] when creation or the
    /// local upsert fails.
    pub async fn create_repository(
        &self,
        request: CreateRepositoryRequest,
    ) -> SyncResult<Repository> {
        let CreateRepositoryRequest {
            name,
            description,
            private,
            auto_init,
        } = request;

        let payload = NewRemoteRepository {
            name: RepositoryName::new(name)?,
            description,
            private,
            auto_init,
        };
        let created = self.remote.create_repository(&payload).await?;
        let repository = self.upsert_remote(&created).await?;
        info!(repository = repository.full_name(), "created repository");

        if let Err(err) = self.sync_branches(&repository).await {
            warn!(
                repository = repository.full_name(),
                error = %err,
                "branch sync after create failed"
            );
        }
        Ok(repository)
    }

    /// Lists remote repositories without writing to the store.
    ///
    /// A `username` other than the token owner's login lists that user's
    /// public repositories. Otherwise every affiliation of the token owner
    /// is listed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] when a listing request fails.
    pub async fn list_remote(
        &self,
        username: Option<&str>,
    ) -> SyncResult<Vec<RemoteRepository>> {
        let other_user = match username {
            Some(name) => {
                let login = self.remote.authenticated_login().await?;
                (!name.eq_ignore_ascii_case(&login)).then_some(name)
            }
            None => None,
        };
        let records = match other_user {
            Some(name) => self.remote.list_user_repositories(name).await?,
            None => self.remote.list_repositories(&Affiliation::ALL).await?,
        };
        Ok(dedup_by_key(records, |record| Some(record.id)))
    }

    async fn fetch(&self, scope: &SyncScope) -> SyncResult<Vec<RemoteRepository>> {
        let mut records = Vec::new();
        if !scope.affiliations().is_empty() {
            records.extend(self.remote.list_repositories(scope.affiliations()).await?);
        }
        if scope.include_starred() {
            records.extend(self.remote.list_starred().await?);
        }
        if let Some(username) = scope.username() {
            let login = self.remote.authenticated_login().await?;
            if !username.eq_ignore_ascii_case(&login) {
                records.extend(self.remote.list_user_repositories(username).await?);
            }
        }
        Ok(dedup_by_key(records, |record| Some(record.id)))
    }

    async fn upsert_remote(&self, record: &RemoteRepository) -> SyncResult<Repository> {
        let local_path = repository_local_path(&self.base_dir, &record.name);
        let snapshot = RepositorySnapshot::from_remote(record, local_path)?;
        let candidate = Repository::synced(snapshot, &*self.clock);
        Ok(self.store.upsert_repository(&candidate).await?)
    }

    async fn upsert_branch(
        &self,
        repository: &Repository,
        remote: &RemoteBranch,
    ) -> SyncResult<Branch> {
        let candidate = Branch::from_remote(
            repository.id(),
            remote,
            repository.snapshot().default_branch(),
            &*self.clock,
        )?;
        Ok(self.store.upsert_branch(&candidate).await?)
    }
}
