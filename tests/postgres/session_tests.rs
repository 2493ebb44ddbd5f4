//! Session persistence against a real database.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::helpers::{FixedClock, TestDatabase, at, clock, snapshot, test_runtime};
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use repo_mirror::mirror::{
    domain::{Branch, BranchName, RemoteBranch, Repository, RepositoryId},
    ports::{BranchStore, RepositoryStore},
};
use repo_mirror::session::{
    domain::{CursorPosition, GitStatus, Session, SessionId, WorkspaceState},
    ports::{SessionStore, SessionStoreError},
    services::{SessionLifecycleService, SessionSummaryCache, StartSessionRequest},
};
use rstest::rstest;

async fn seed(db: &TestDatabase<'_>, remote_id: u64) -> Repository {
    db.store
        .upsert_repository(&Repository::synced(
            snapshot(remote_id, &format!("octo/desk-{remote_id}")),
            &clock(),
        ))
        .await
        .expect("seed repository")
}

#[rstest]
fn start_supersedes_the_active_session(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_supersede").expect("test database");

    rt.block_on(async {
        let repository = seed(&db, 1).await;
        let other = seed(&db, 2).await;
        let morning = FixedClock(at("2026-03-01T09:00:00Z"));
        let noon = FixedClock(at("2026-03-01T12:00:00Z"));

        let first = db
            .store
            .start_session(&Session::start(repository.id(), None, "plan", &morning))
            .await
            .expect("first start");
        let elsewhere = db
            .store
            .start_session(&Session::start(other.id(), None, "", &morning))
            .await
            .expect("other repository start");
        let second = db
            .store
            .start_session(&Session::start(repository.id(), None, "build", &noon))
            .await
            .expect("second start");

        assert_eq!(first.superseded, 0);
        assert_eq!(elsewhere.superseded, 0);
        assert_eq!(second.superseded, 1);

        let closed = db
            .store
            .find_session(first.session.id())
            .await
            .expect("lookup")
            .expect("first session");
        assert!(!closed.is_active());
        assert_eq!(closed.ended_at(), Some(noon.0));
        assert_eq!(
            db.store
                .active_session(repository.id())
                .await
                .expect("active lookup"),
            Some(second.session.clone())
        );
        assert_eq!(
            db.store
                .active_session(other.id())
                .await
                .expect("active lookup"),
            Some(elsewhere.session)
        );

        let history = db
            .store
            .list_sessions(repository.id())
            .await
            .expect("history");
        let ids: Vec<SessionId> = history.iter().map(Session::id).collect();
        assert_eq!(ids, vec![second.session.id(), first.session.id()]);
    });
}

#[rstest]
fn concurrent_starts_leave_one_active_session(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_race").expect("test database");

    rt.block_on(async {
        let repository = seed(&db, 3).await;
        let store = Arc::new(db.store.clone());
        let service = Arc::new(SessionLifecycleService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::new(SessionSummaryCache::new()),
            Arc::new(clock()),
        ));

        let handles: Vec<_> = (0..6)
            .map(|n| {
                let worker = Arc::clone(&service);
                let repository_id = repository.id();
                tokio::spawn(async move {
                    worker
                        .start(
                            StartSessionRequest::new(repository_id)
                                .with_notes(format!("run {n}")),
                        )
                        .await
                })
            })
            .collect();

        let mut superseded = 0;
        for handle in handles {
            let started = handle.await.expect("task joins").expect("start succeeds");
            superseded += started.superseded;
        }

        let sessions = store.list_sessions(repository.id()).await.expect("history");
        let active = sessions.iter().filter(|session| session.is_active()).count();
        assert_eq!(sessions.len(), 6);
        assert_eq!(active, 1);
        assert_eq!(superseded, 5);
    });
}

#[rstest]
fn pruning_a_branch_clears_session_references(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_prune").expect("test database");

    rt.block_on(async {
        let repository = seed(&db, 4).await;
        let feature = db
            .store
            .upsert_branch(
                &Branch::from_remote(
                    repository.id(),
                    &RemoteBranch::new("feature", "f00"),
                    "main",
                    &clock(),
                )
                .expect("valid branch"),
            )
            .await
            .expect("branch");
        let started = db
            .store
            .start_session(&Session::start(
                repository.id(),
                Some(feature.id()),
                "",
                &clock(),
            ))
            .await
            .expect("start");

        db.store
            .prune_branches(repository.id(), &[BranchName::new("main").expect("valid")])
            .await
            .expect("prune");

        let session = db
            .store
            .find_session(started.session.id())
            .await
            .expect("lookup")
            .expect("session survives");
        assert_eq!(session.branch_id(), None);
        assert!(session.is_active());
    });
}

#[rstest]
fn workspace_state_round_trips_through_jsonb(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_workspace").expect("test database");

    rt.block_on(async {
        let repository = seed(&db, 5).await;
        let started = db
            .store
            .start_session(&Session::start(repository.id(), None, "notes", &clock()))
            .await
            .expect("start");
        let mut session = started.session;
        let workspace = WorkspaceState {
            last_file: Some("src/main.rs".to_owned()),
            cursor: Some(CursorPosition::new(12, 4)),
            open_files: vec!["src/main.rs".to_owned(), "Cargo.toml".to_owned()],
            environment: BTreeMap::from([("RUST_LOG".to_owned(), "debug".to_owned())]),
            git_status: Some(GitStatus {
                modified: vec!["src/main.rs".to_owned()],
                ..GitStatus::default()
            }),
        };
        session
            .record_workspace(workspace.clone())
            .expect("active session");

        db.store.update_session(&session).await.expect("update");

        let stored = db
            .store
            .find_session(session.id())
            .await
            .expect("lookup")
            .expect("stored session");
        assert_eq!(stored.workspace(), &workspace);
        assert_eq!(stored, session);
    });
}

#[rstest]
fn missing_targets_are_reported(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_missing").expect("test database");

    rt.block_on(async {
        let missing_repository = RepositoryId::new();
        let orphan = Session::start(missing_repository, None, "", &clock());

        let start = db.store.start_session(&orphan).await;
        let update = db.store.update_session(&orphan).await;

        assert!(matches!(
            start,
            Err(SessionStoreError::RepositoryNotFound(id)) if id == missing_repository
        ));
        assert!(matches!(
            update,
            Err(SessionStoreError::NotFound(id)) if id == orphan.id()
        ));
    });
}

#[rstest]
fn deleting_a_repository_removes_its_sessions(shared_test_cluster: &'static TestCluster) {
    let rt = test_runtime();
    let db = TestDatabase::create(shared_test_cluster, "session_cascade").expect("test database");

    rt.block_on(async {
        let repository = seed(&db, 6).await;
        let started = db
            .store
            .start_session(&Session::start(repository.id(), None, "", &clock()))
            .await
            .expect("start");

        db.store
            .delete_repository(repository.id())
            .await
            .expect("delete");

        assert_eq!(
            db.store
                .find_session(started.session.id())
                .await
                .expect("lookup"),
            None
        );
    });
}
