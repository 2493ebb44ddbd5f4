//! When steps for repository mirror BDD scenarios.

use super::given::set_remote_branches;
use super::world::{MirrorWorld, run_async};
use eyre::WrapErr;
use repo_mirror::mirror::domain::SyncScope;
use repo_mirror::session::services::StartSessionRequest;
use rstest_bdd_macros::when;

/// Runs a full sync and records its outcome.
pub(super) fn sync_mirror(world: &mut MirrorWorld) -> Result<(), eyre::Report> {
    let outcome =
        run_async(world.sync_service().sync(&SyncScope::new())).wrap_err("sync the mirror")?;
    world.last_sync = Some(outcome);
    Ok(())
}

/// Starts a session on a stored repository.
pub(super) fn start_session_on(
    world: &mut MirrorWorld,
    full_name: &str,
) -> Result<(), eyre::Report> {
    let repository = world.stored(full_name)?;
    run_async(
        world
            .sessions()
            .start(StartSessionRequest::new(repository.id())),
    )
    .wrap_err("start a session")?;
    Ok(())
}

#[when("the mirror is synced")]
fn mirror_is_synced(world: &mut MirrorWorld) -> Result<(), eyre::Report> {
    sync_mirror(world)
}

#[when(r#""{full_name}" has remote branches "{names}""#)]
fn remote_branches_change(
    world: &mut MirrorWorld,
    full_name: String,
    names: String,
) -> Result<(), eyre::Report> {
    set_remote_branches(world, &full_name, &names).wrap_err("replace remote branches")
}

#[when(r#"a session is started on "{full_name}""#)]
fn session_is_started(world: &mut MirrorWorld, full_name: String) -> Result<(), eyre::Report> {
    start_session_on(world, &full_name)
}

#[when(r#""{full_name}" is deleted"#)]
fn repository_is_deleted(world: &mut MirrorWorld, full_name: String) -> Result<(), eyre::Report> {
    let repository = world.stored(&full_name)?;
    let report = run_async(world.deletion_service().delete(&repository));
    world.last_report = Some(report);
    Ok(())
}
