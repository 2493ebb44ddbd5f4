//! Given steps for repository mirror BDD scenarios.

use super::when::{start_session_on, sync_mirror};
use super::world::MirrorWorld;
use eyre::WrapErr;
use repo_mirror::mirror::{
    domain::{Affiliation, OwnerKind, RemoteBranch},
    ports::RemoteHostError,
};
use rstest_bdd_macros::given;

fn list_remote(
    world: &mut MirrorWorld,
    full_name: &str,
    kind: OwnerKind,
    affiliation: Affiliation,
) -> Result<(), eyre::Report> {
    let record = world.remote_record(full_name, kind)?;
    world
        .remote
        .add_repository(affiliation, record)
        .wrap_err("seed remote listing")?;
    world
        .remote
        .set_branches(full_name, vec![RemoteBranch::new("main", "0000001")])
        .wrap_err("seed default branch")?;
    Ok(())
}

/// Replaces the remote branch list of a repository.
pub(super) fn set_remote_branches(
    world: &MirrorWorld,
    full_name: &str,
    names: &str,
) -> Result<(), RemoteHostError> {
    let branches = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .enumerate()
        .map(|(index, name)| RemoteBranch::new(name, format!("{index:07}")))
        .collect();
    world.remote.set_branches(full_name, branches)
}

#[given(r#"the remote lists "{full_name}" owned by a user"#)]
fn remote_lists_user_repository(
    world: &mut MirrorWorld,
    full_name: String,
) -> Result<(), eyre::Report> {
    list_remote(world, &full_name, OwnerKind::User, Affiliation::Owner)
}

#[given(r#"the remote lists "{full_name}" owned by an organization"#)]
fn remote_lists_organization_repository(
    world: &mut MirrorWorld,
    full_name: String,
) -> Result<(), eyre::Report> {
    list_remote(
        world,
        &full_name,
        OwnerKind::Organization,
        Affiliation::OrganizationMember,
    )
}

#[given(r#""{full_name}" has remote branches "{names}""#)]
fn has_remote_branches(
    world: &mut MirrorWorld,
    full_name: String,
    names: String,
) -> Result<(), eyre::Report> {
    set_remote_branches(world, &full_name, &names).wrap_err("seed remote branches")
}

#[given("the mirror is synced")]
fn mirror_is_synced(world: &mut MirrorWorld) -> Result<(), eyre::Report> {
    sync_mirror(world)
}

#[given(r#"a session is started on "{full_name}""#)]
fn session_is_started(world: &mut MirrorWorld, full_name: String) -> Result<(), eyre::Report> {
    start_session_on(world, &full_name)
}

#[given(r#"a local checkout of "{name}" exists"#)]
fn local_checkout_exists(world: &mut MirrorWorld, name: String) -> Result<(), eyre::Report> {
    let checkout = world.base_dir.join(&name);
    std::fs::create_dir_all(checkout.join(".git")).wrap_err("create checkout")?;
    std::fs::write(checkout.join("README.md"), "checkout\n").wrap_err("write checkout file")?;
    Ok(())
}
