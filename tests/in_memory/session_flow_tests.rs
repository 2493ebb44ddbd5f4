//! Session flows spanning resyncs and repository deletion.

use super::helpers::{Mirror, mirror, publish, remote_record};
use repo_mirror::mirror::{
    domain::{Affiliation, OwnerKind, RemoteBranch, SyncScope},
    ports::RepositoryStore,
};
use repo_mirror::session::{
    domain::{CursorPosition, WorkspaceState},
    ports::SessionStore,
    services::StartSessionRequest,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn session_outlives_its_pruned_branch(mirror: Mirror) -> Result<(), eyre::Report> {
    publish(
        &mirror,
        Affiliation::Owner,
        remote_record(4, "octo", "editor", OwnerKind::User),
    )?;
    mirror.sync.sync(&SyncScope::new()).await?;
    let repository = mirror.catalog.find_by_full_name("octo/editor").await?;

    let started = mirror
        .sessions
        .start(
            StartSessionRequest::new(repository.id())
                .with_branch("dev")
                .with_notes("refactor parser"),
        )
        .await?;
    eyre::ensure!(started.session.branch_id().is_some(), "branch recorded");
    mirror
        .sessions
        .record_workspace(
            started.session.id(),
            WorkspaceState {
                last_file: Some("src/parser.rs".to_owned()),
                cursor: Some(CursorPosition::new(40, 2)),
                ..WorkspaceState::default()
            },
        )
        .await?;
    let before = mirror.sessions.summary(repository.id()).await?;
    eyre::ensure!(
        before.active.as_ref().and_then(|active| active.branch_id()).is_some(),
        "cached summary names the branch"
    );

    mirror.remote.set_branches(
        "octo/editor",
        vec![RemoteBranch::new("main", "3333333")],
    )?;
    mirror.sync.sync(&SyncScope::new()).await?;

    let session = mirror
        .store
        .find_session(started.session.id())
        .await?
        .ok_or_else(|| eyre::eyre!("session disappeared"))?;
    eyre::ensure!(session.branch_id().is_none(), "branch reference cleared");
    eyre::ensure!(session.is_active(), "session still active");
    eyre::ensure!(
        session.workspace().last_file.as_deref() == Some("src/parser.rs"),
        "workspace kept"
    );
    let after = mirror.sessions.summary(repository.id()).await?;
    eyre::ensure!(
        after.active.as_ref().is_some_and(|active| active.branch_id().is_none()),
        "summary reflects the cleared branch, got {after:?}"
    );

    let ended = mirror
        .sessions
        .end(started.session.id(), Some("parser done"))
        .await?;
    eyre::ensure!(
        ended.notes() == "refactor parser\nparser done",
        "closing notes appended, got {:?}",
        ended.notes()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletion_drops_sessions_and_cached_summary(mirror: Mirror) -> Result<(), eyre::Report> {
    publish(
        &mirror,
        Affiliation::Owner,
        remote_record(5, "octo", "journal", OwnerKind::User),
    )?;
    mirror.sync.sync(&SyncScope::new()).await?;
    let repository = mirror.catalog.find_by_full_name("octo/journal").await?;
    mirror
        .sessions
        .start(StartSessionRequest::new(repository.id()))
        .await?;

    let cached = mirror.sessions.summary(repository.id()).await?;
    eyre::ensure!(cached.has_sessions, "summary sees the session");
    eyre::ensure!(
        mirror.sessions.summaries().get(repository.id()).is_some(),
        "summary is cached"
    );

    let report = mirror.deletion.delete(&repository).await;
    eyre::ensure!(!report.record.is_failed(), "record removed: {report:?}");

    eyre::ensure!(
        mirror.sessions.summaries().get(repository.id()).is_none(),
        "cached summary invalidated"
    );
    eyre::ensure!(
        mirror.store.list_sessions(repository.id()).await?.is_empty(),
        "sessions removed with the repository"
    );
    eyre::ensure!(
        mirror.store.find_repository(repository.id()).await?.is_none(),
        "record removed"
    );
    Ok(())
}
