//! Then steps for repository mirror BDD scenarios.

use super::world::{MirrorWorld, run_async};
use repo_mirror::mirror::{ports::BranchStore, services::StageOutcome};
use rstest_bdd_macros::then;

#[then("{count:usize} repositories are stored")]
fn repositories_are_stored(world: &MirrorWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = world
        .last_sync
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no sync has run"))?;
    if outcome.summary.total != count {
        return Err(eyre::eyre!(
            "expected {count} repositories, sync wrote {}",
            outcome.summary.total
        ));
    }
    Ok(())
}

#[then("the sync summary counts {count:usize} organization repositories")]
fn organization_count(world: &MirrorWorld, count: usize) -> Result<(), eyre::Report> {
    let outcome = world
        .last_sync
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no sync has run"))?;
    if outcome.summary.organization != count {
        return Err(eyre::eyre!(
            "expected {count} organization repositories, found {}",
            outcome.summary.organization
        ));
    }
    Ok(())
}

#[then(r#""{full_name}" has local branches "{names}""#)]
fn has_local_branches(
    world: &MirrorWorld,
    full_name: String,
    names: String,
) -> Result<(), eyre::Report> {
    let repository = world.stored(&full_name)?;
    let branches = run_async(world.store.list_branches(repository.id()))?;
    let actual: Vec<&str> = branches.iter().map(|branch| branch.name().as_str()).collect();
    let expected: Vec<&str> = names.split(',').map(str::trim).collect();
    if actual != expected {
        return Err(eyre::eyre!("expected branches {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#""{full_name}" has {active:usize} active session out of {total:usize}"#)]
fn active_sessions(
    world: &MirrorWorld,
    full_name: String,
    active: usize,
    total: usize,
) -> Result<(), eyre::Report> {
    let repository = world.stored(&full_name)?;
    let history = run_async(world.sessions().history(repository.id()))?;
    let active_count = history.iter().filter(|session| session.is_active()).count();
    if active_count != active || history.len() != total {
        return Err(eyre::eyre!(
            "expected {active}/{total} active sessions, found {active_count}/{}",
            history.len()
        ));
    }
    Ok(())
}

#[then("every deletion stage completed")]
fn every_stage_completed(world: &MirrorWorld) -> Result<(), eyre::Report> {
    let report = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no deletion has run"))?;
    let stages = [&report.remote, &report.local, &report.record];
    if stages.iter().any(|stage| **stage != StageOutcome::Completed) {
        return Err(eyre::eyre!("incomplete deletion: {report:?}"));
    }
    Ok(())
}

#[then(r#""{full_name}" is no longer stored"#)]
fn no_longer_stored(world: &MirrorWorld, full_name: String) -> Result<(), eyre::Report> {
    if world.stored(&full_name).is_ok() {
        return Err(eyre::eyre!("'{full_name}' is still stored"));
    }
    Ok(())
}
