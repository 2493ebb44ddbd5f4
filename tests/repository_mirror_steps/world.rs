//! Shared world state for repository mirror BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use repo_mirror::mirror::{
    adapters::{
        memory::{InMemoryMirrorStore, InMemoryRemoteHost},
        workspace::CapStdWorkspace,
    },
    domain::{OwnerKind, RemoteOwner, RemoteRepository, Repository},
    ports::RepositoryStore,
    services::{DeletionReport, DeletionService, SyncOutcome, SyncService},
};
use repo_mirror::session::services::{SessionLifecycleService, SessionSummaryCache};
use rstest::fixture;
use tempfile::TempDir;

/// Scenario world for repository mirror behaviour tests.
pub struct MirrorWorld {
    _temp: TempDir,
    /// Workspace base directory.
    pub base_dir: Utf8PathBuf,
    /// Local mirror store.
    pub store: Arc<InMemoryMirrorStore>,
    /// Scripted remote host.
    pub remote: Arc<InMemoryRemoteHost>,
    /// Session summary cache shared by the services.
    pub summaries: Arc<SessionSummaryCache>,
    /// Remote ids handed out so far.
    pub next_remote_id: u64,
    /// Outcome of the last sync.
    pub last_sync: Option<SyncOutcome>,
    /// Report of the last deletion.
    pub last_report: Option<DeletionReport>,
}

impl MirrorWorld {
    /// Creates a world with an empty store, remote, and workspace.
    ///
    /// # Panics
    ///
    /// Panics when the temporary workspace cannot be created.
    #[must_use]
    #[expect(clippy::expect_used, reason = "fixture setup failures abort the scenario")]
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temporary workspace");
        let base_dir =
            Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 workspace path");
        Self {
            _temp: temp,
            base_dir,
            store: Arc::new(InMemoryMirrorStore::new()),
            remote: Arc::new(InMemoryRemoteHost::new("octo")),
            summaries: Arc::new(SessionSummaryCache::new()),
            next_remote_id: 1,
            last_sync: None,
            last_report: None,
        }
    }

    /// Builds a sync service over the world's adapters.
    pub fn sync_service(
        &self,
    ) -> SyncService<InMemoryMirrorStore, InMemoryRemoteHost, DefaultClock> {
        SyncService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            Arc::new(DefaultClock),
            self.base_dir.clone(),
        )
        .with_summary_cache(Arc::clone(&self.summaries))
    }

    /// Builds a deletion service over the world's adapters.
    pub fn deletion_service(
        &self,
    ) -> DeletionService<InMemoryMirrorStore, InMemoryRemoteHost, CapStdWorkspace> {
        DeletionService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            Arc::new(CapStdWorkspace::new(self.base_dir.clone())),
        )
        .with_summary_cache(Arc::clone(&self.summaries))
    }

    /// Builds a session service over the world's store.
    pub fn sessions(
        &self,
    ) -> SessionLifecycleService<InMemoryMirrorStore, InMemoryMirrorStore, DefaultClock> {
        SessionLifecycleService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.summaries),
            Arc::new(DefaultClock),
        )
    }

    /// Looks up a stored repository by qualified name.
    pub fn stored(&self, full_name: &str) -> Result<Repository, eyre::Report> {
        run_async(self.store.find_by_full_name(full_name))?
            .ok_or_else(|| eyre::eyre!("repository '{full_name}' is not stored"))
    }

    /// Builds a remote record for `full_name` with a fresh remote id.
    pub fn remote_record(
        &mut self,
        full_name: &str,
        kind: OwnerKind,
    ) -> Result<RemoteRepository, eyre::Report> {
        let (owner, name) = full_name
            .split_once('/')
            .ok_or_else(|| eyre::eyre!("'{full_name}' is not owner/name"))?;
        let id = self.next_remote_id;
        self.next_remote_id += 1;
        Ok(RemoteRepository {
            id,
            name: name.to_owned(),
            full_name: Some(full_name.to_owned()),
            description: None,
            html_url: format!("https://github.com/{full_name}"),
            private: false,
            fork: false,
            created_at: "2025-01-01T00:00:00Z".to_owned(),
            updated_at: "2025-06-01T00:00:00Z".to_owned(),
            pushed_at: None,
            size: 0,
            language: None,
            default_branch: Some("main".to_owned()),
            owner: RemoteOwner {
                login: owner.to_owned(),
                kind,
            },
            stargazers_count: 0,
        })
    }
}

impl Default for MirrorWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MirrorWorld {
    MirrorWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
