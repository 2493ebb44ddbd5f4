//! End-to-end mirror flows over the in-memory adapters.

use std::sync::Arc;

use super::helpers::{Mirror, mirror, publish, remote_record};
use mockable::DefaultClock;
use repo_mirror::mirror::{
    adapters::memory::InMemoryRemoteHost,
    domain::{
        Affiliation, ImportRequest, OrganizationFilter, OwnerKind, RepositoryFilter,
        RepositorySort, SyncScope,
    },
    ports::RepositoryStore,
    services::{CatalogError, CreateRepositoryRequest, StageOutcome, SyncService},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn import_then_search_and_inspect(mirror: Mirror) -> Result<(), eyre::Report> {
    publish(
        &mirror,
        Affiliation::Owner,
        remote_record(1, "octo", "dotfiles", OwnerKind::User),
    )?;
    publish(
        &mirror,
        Affiliation::OrganizationMember,
        remote_record(2, "acme", "service", OwnerKind::Organization),
    )?;
    publish(
        &mirror,
        Affiliation::Collaborator,
        remote_record(3, "friend", "game", OwnerKind::User),
    )?;

    let outcome = mirror
        .sync
        .import(&ImportRequest {
            include_collaborations: false,
            ..ImportRequest::default()
        })
        .await?;

    let imported: Vec<&str> = outcome
        .repositories
        .iter()
        .map(|repository| repository.full_name())
        .collect();
    eyre::ensure!(
        imported == vec!["octo/dotfiles", "acme/service"],
        "unexpected import result {imported:?}"
    );
    eyre::ensure!(outcome.summary.organization == 1, "organization count");

    let personal = mirror
        .catalog
        .search(
            &RepositoryFilter::new().with_organization(OrganizationFilter::Personal),
            RepositorySort::UpdatedDesc,
        )
        .await?;
    let personal_names: Vec<&str> = personal.iter().map(|r| r.full_name()).collect();
    eyre::ensure!(
        personal_names == vec!["friend/game", "octo/dotfiles"],
        "personal search returned {personal_names:?}"
    );

    let service = mirror.catalog.find_by_full_name("acme/service").await?;
    let detail = mirror.catalog.detail(service.id()).await?;
    let first = detail
        .branches
        .first()
        .ok_or_else(|| eyre::eyre!("service has no branches"))?;
    eyre::ensure!(first.is_default(), "default branch is listed first");
    eyre::ensure!(
        first.last_commit_message() == Some("Initial commit"),
        "head commit message is mirrored"
    );
    eyre::ensure!(
        service.local_path() == Some(mirror.base_dir.join("service").as_path()),
        "local path sits under the base directory"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_then_delete_round_trip(mirror: Mirror) -> Result<(), eyre::Report> {
    let created = mirror
        .sync
        .create_repository(
            CreateRepositoryRequest::new("scratch")
                .with_description("Throwaway")
                .private(true),
        )
        .await?;
    eyre::ensure!(created.full_name() == "octo/scratch", "owned by token owner");
    eyre::ensure!(created.is_private(), "privacy is mirrored");

    let checkout = mirror.base_dir.join("scratch");
    std::fs::create_dir_all(&checkout)?;
    std::fs::write(checkout.join("notes.txt"), "draft\n")?;

    let report = mirror.deletion.delete(&created).await;

    eyre::ensure!(report.is_clean(), "deletion incomplete: {report:?}");
    eyre::ensure!(report.local == StageOutcome::Completed, "checkout removed");
    eyre::ensure!(!checkout.exists(), "checkout directory still present");
    eyre::ensure!(
        mirror.remote.deleted()? == vec!["octo/scratch".to_owned()],
        "remote deletion recorded"
    );
    let lookup = mirror.catalog.find_by_full_name("octo/scratch").await;
    eyre::ensure!(
        matches!(lookup, Err(CatalogError::NameNotFound(_))),
        "record still present: {lookup:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resync_tracks_remote_changes(mirror: Mirror) -> Result<(), eyre::Report> {
    let mut record = remote_record(8, "octo", "tracker", OwnerKind::User);
    publish(&mirror, Affiliation::Owner, record.clone())?;
    mirror.sync.sync(&SyncScope::new()).await?;
    let first = mirror
        .store
        .find_by_full_name("octo/tracker")
        .await?
        .ok_or_else(|| eyre::eyre!("tracker not stored"))?;

    record.description = Some("Now described".to_owned());
    record.language = Some("Rust".to_owned());
    // A second host stands in for the remote after the edit.
    let edited = InMemoryRemoteHost::new("octo");
    edited.add_repository(Affiliation::Owner, record)?;
    edited.set_branches("octo/tracker", Vec::new())?;
    let resync = SyncService::new(
        Arc::clone(&mirror.store),
        Arc::new(edited),
        Arc::new(DefaultClock),
        mirror.base_dir.clone(),
    );
    let outcome = resync.sync(&SyncScope::new()).await?;

    let updated = outcome
        .repositories
        .first()
        .ok_or_else(|| eyre::eyre!("resync wrote nothing"))?;
    eyre::ensure!(updated.id() == first.id(), "local id is stable across syncs");
    eyre::ensure!(
        updated.snapshot().description() == Some("Now described"),
        "description refreshed"
    );
    let detail = mirror.catalog.detail(updated.id()).await?;
    eyre::ensure!(detail.branches.is_empty(), "vanished branches are pruned");
    Ok(())
}
