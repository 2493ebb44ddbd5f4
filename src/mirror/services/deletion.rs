//! Best-effort deletion of a repository across the remote host, the local
//! workspace, and the store.

use crate::mirror::{
    domain::{Repository, RepositoryId, deletion_candidates},
    ports::{RemovalOutcome, RemoteHost, RepositoryStore, WorkspaceCleaner},
};
use crate::session::services::SessionSummaryCache;
use camino::Utf8PathBuf;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of one deletion stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage did its work.
    Completed,
    /// The stage had nothing to do.
    Skipped,
    /// The stage failed; later stages still ran.
    Failed(String),
}

impl StageOutcome {
    /// Returns whether the stage failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Skipped => f.write_str("skipped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-stage account of a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    /// Local identifier of the deleted repository.
    pub repository_id: RepositoryId,
    /// Qualified name of the deleted repository.
    pub full_name: String,
    /// Remote deletion.
    pub remote: StageOutcome,
    /// Local directory removal.
    pub local: StageOutcome,
    /// Store record deletion.
    pub record: StageOutcome,
    /// Directory that was removed, if any.
    pub removed_path: Option<Utf8PathBuf>,
}

impl DeletionReport {
    /// Returns whether no stage failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !(self.remote.is_failed() || self.local.is_failed() || self.record.is_failed())
    }
}

/// Three-stage repository deletion service.
///
/// Each stage runs regardless of the others' results.
#[derive(Clone)]
pub struct DeletionService<S, H, W>
where
    S: RepositoryStore,
    H: RemoteHost,
    W: WorkspaceCleaner,
{
    store: Arc<S>,
    remote: Arc<H>,
    workspace: Arc<W>,
    summaries: Option<Arc<SessionSummaryCache>>,
}

impl<S, H, W> DeletionService<S, H, W>
where
    S: RepositoryStore,
    H: RemoteHost,
    W: WorkspaceCleaner,
{
    /// Creates a new deletion service.
    #[must_use]
    pub const fn new(store: Arc<S>, remote: Arc<H>, workspace: Arc<W>) -> Self {
        Self {
            store,
            remote,
            workspace,
            summaries: None,
        }
    }

    /// Invalidates `summaries` for the repository once its record is gone.
    #[must_use]
    pub fn with_summary_cache(mut self, summaries: Arc<SessionSummaryCache>) -> Self {
        self.summaries = Some(summaries);
        self
    }

    /// Deletes `repository` remotely, locally, and from the store.
    ///
    /// Failures are logged and reported per stage; none aborts the others.
    pub async fn delete(&self, repository: &Repository) -> DeletionReport {
        let full_name = repository.full_name().to_owned();

        let remote = match self.remote.delete_repository(&full_name).await {
            Ok(()) => StageOutcome::Completed,
            Err(err) => {
                error!(repository = %full_name, error = %err, "remote delete failed");
                StageOutcome::Failed(err.to_string())
            }
        };

        let (local, removed_path) = self.remove_local(repository);

        let record = match self.store.delete_repository(repository.id()).await {
            Ok(()) => {
                if let Some(summaries) = &self.summaries {
                    summaries.invalidate(repository.id());
                }
                StageOutcome::Completed
            }
            Err(err) => {
                error!(repository = %full_name, error = %err, "record delete failed");
                StageOutcome::Failed(err.to_string())
            }
        };

        let report = DeletionReport {
            repository_id: repository.id(),
            full_name,
            remote,
            local,
            record,
            removed_path,
        };
        info!(
            repository = %report.full_name,
            remote = %report.remote,
            local = %report.local,
            record = %report.record,
            "deleted repository"
        );
        report
    }

    fn remove_local(&self, repository: &Repository) -> (StageOutcome, Option<Utf8PathBuf>) {
        let candidates = deletion_candidates(
            self.workspace.base_dir(),
            repository.local_path(),
            repository.name(),
        );

        let mut last_failure = None;
        for candidate in &candidates {
            match self.workspace.remove_directory(candidate) {
                Ok(RemovalOutcome::Removed(path)) => return (StageOutcome::Completed, Some(path)),
                Ok(RemovalOutcome::OutsideBase) => {
                    warn!(path = %candidate, "refusing to remove path outside the base directory");
                }
                Ok(RemovalOutcome::NotADirectory) => {
                    debug!(path = %candidate, "candidate is not a directory");
                }
                Ok(RemovalOutcome::Missing) => {}
                Err(err) => {
                    error!(path = %candidate, error = %err, "local delete failed");
                    last_failure = Some(err.to_string());
                }
            }
        }

        (last_failure.map_or(StageOutcome::Skipped, StageOutcome::Failed), None)
    }
}
