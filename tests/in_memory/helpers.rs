//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultClock;
use repo_mirror::mirror::{
    adapters::{
        memory::{InMemoryMirrorStore, InMemoryRemoteHost},
        workspace::CapStdWorkspace,
    },
    domain::{Affiliation, OwnerKind, RemoteBranch, RemoteOwner, RemoteRepository},
    services::{CatalogService, DeletionService, SyncService},
};
use repo_mirror::session::services::{SessionLifecycleService, SessionSummaryCache};
use rstest::fixture;
use tempfile::TempDir;

/// Adapters and services wired the way the binary wires them.
pub struct Mirror {
    _temp: TempDir,
    /// Workspace base directory.
    pub base_dir: Utf8PathBuf,
    /// Local store.
    pub store: Arc<InMemoryMirrorStore>,
    /// Scripted remote host whose token belongs to `octo`.
    pub remote: Arc<InMemoryRemoteHost>,
    /// Sync service.
    pub sync: SyncService<InMemoryMirrorStore, InMemoryRemoteHost, DefaultClock>,
    /// Catalog queries.
    pub catalog: CatalogService<InMemoryMirrorStore, InMemoryRemoteHost>,
    /// Deletion service sharing the session summary cache.
    pub deletion: DeletionService<InMemoryMirrorStore, InMemoryRemoteHost, CapStdWorkspace>,
    /// Session lifecycle service.
    pub sessions: SessionLifecycleService<InMemoryMirrorStore, InMemoryMirrorStore, DefaultClock>,
}

/// Provides a freshly wired mirror over a temporary workspace.
///
/// # Panics
///
/// Panics when the temporary workspace cannot be created.
#[fixture]
pub fn mirror() -> Mirror {
    let temp = TempDir::new().expect("temporary workspace");
    let base_dir =
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 workspace path");
    let store = Arc::new(InMemoryMirrorStore::new());
    let remote = Arc::new(InMemoryRemoteHost::new("octo"));
    let clock = Arc::new(DefaultClock);
    let summaries = Arc::new(SessionSummaryCache::new());

    Mirror {
        sync: SyncService::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::clone(&clock),
            base_dir.clone(),
        )
        .with_summary_cache(Arc::clone(&summaries)),
        catalog: CatalogService::new(Arc::clone(&store), Arc::clone(&remote)),
        deletion: DeletionService::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            Arc::new(CapStdWorkspace::new(base_dir.clone())),
        )
        .with_summary_cache(Arc::clone(&summaries)),
        sessions: SessionLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            summaries,
            clock,
        ),
        _temp: temp,
        base_dir,
        store,
        remote,
    }
}

/// Builds a remote record.
pub fn remote_record(id: u64, owner: &str, name: &str, kind: OwnerKind) -> RemoteRepository {
    RemoteRepository {
        id,
        name: name.to_owned(),
        full_name: Some(format!("{owner}/{name}")),
        description: None,
        html_url: format!("https://github.com/{owner}/{name}"),
        private: false,
        fork: false,
        created_at: "2024-04-01T00:00:00Z".to_owned(),
        updated_at: format!("2024-05-{:02}T00:00:00Z", id % 28 + 1),
        pushed_at: None,
        size: id,
        language: None,
        default_branch: Some("main".to_owned()),
        owner: RemoteOwner {
            login: owner.to_owned(),
            kind,
        },
        stargazers_count: 0,
    }
}

/// Lists `record` under `affiliation` with a `main` and a `dev` branch.
///
/// # Errors
///
/// Returns an error when the remote state lock is poisoned.
pub fn publish(
    mirror: &Mirror,
    affiliation: Affiliation,
    record: RemoteRepository,
) -> Result<(), eyre::Report> {
    let full_name = record.qualified_name();
    mirror.remote.add_repository(affiliation, record)?;
    mirror.remote.set_branches(
        full_name,
        vec![
            RemoteBranch::new("main", "1111111").with_commit_message("Initial commit"),
            RemoteBranch::new("dev", "2222222"),
        ],
    )?;
    Ok(())
}
