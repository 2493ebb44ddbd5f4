//! In-memory mirror store for tests and ephemeral runs.
//!
//! One store holds repositories, branches, and sessions so that repository
//! deletion cascades and branch pruning clears session references the same
//! way the relational schema does.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::mirror::{
    domain::{
        Branch, BranchId, BranchName, RemoteRepositoryId, Repository, RepositoryFilter,
        RepositoryId, RepositorySort, sort_for_display,
    },
    ports::{BranchStore, MirrorStoreError, MirrorStoreResult, RepositoryStore},
};
use crate::session::domain::{Session, SessionId};

/// Thread-safe in-memory store for repositories, branches, and sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMirrorStore {
    state: Arc<RwLock<MirrorState>>,
}

#[derive(Debug, Default)]
pub(crate) struct MirrorState {
    pub(crate) repositories: HashMap<RepositoryId, Repository>,
    pub(crate) remote_index: HashMap<RemoteRepositoryId, RepositoryId>,
    pub(crate) branches: HashMap<BranchId, Branch>,
    pub(crate) sessions: HashMap<SessionId, Session>,
}

impl InMemoryMirrorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read_state(&self) -> Result<RwLockReadGuard<'_, MirrorState>, std::io::Error> {
        self.state
            .read()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    pub(crate) fn write_state(&self) -> Result<RwLockWriteGuard<'_, MirrorState>, std::io::Error> {
        self.state
            .write()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    fn read(&self) -> MirrorStoreResult<RwLockReadGuard<'_, MirrorState>> {
        self.read_state().map_err(MirrorStoreError::persistence)
    }

    fn write(&self) -> MirrorStoreResult<RwLockWriteGuard<'_, MirrorState>> {
        self.write_state().map_err(MirrorStoreError::persistence)
    }
}

impl MirrorState {
    fn sorted(&self, sort: RepositorySort, filter: Option<&RepositoryFilter>) -> Vec<Repository> {
        let mut repositories: Vec<Repository> = self
            .repositories
            .values()
            .filter(|repository| filter.is_none_or(|criteria| criteria.matches(repository)))
            .cloned()
            .collect();
        sort.sort(&mut repositories);
        repositories
    }
}

#[async_trait]
impl RepositoryStore for InMemoryMirrorStore {
    async fn upsert_repository(&self, candidate: &Repository) -> MirrorStoreResult<Repository> {
        let mut state = self.write()?;
        let existing_id = state.remote_index.get(&candidate.remote_id()).copied();

        if let Some(id) = existing_id
            && let Some(stored) = state.repositories.get_mut(&id)
        {
            stored.apply_sync(candidate);
            return Ok(stored.clone());
        }

        state
            .remote_index
            .insert(candidate.remote_id(), candidate.id());
        state
            .repositories
            .insert(candidate.id(), candidate.clone());
        Ok(candidate.clone())
    }

    async fn find_repository(&self, id: RepositoryId) -> MirrorStoreResult<Option<Repository>> {
        Ok(self.read()?.repositories.get(&id).cloned())
    }

    async fn find_by_remote_id(
        &self,
        remote_id: RemoteRepositoryId,
    ) -> MirrorStoreResult<Option<Repository>> {
        let state = self.read()?;
        Ok(state
            .remote_index
            .get(&remote_id)
            .and_then(|id| state.repositories.get(id))
            .cloned())
    }

    async fn find_by_full_name(&self, full_name: &str) -> MirrorStoreResult<Option<Repository>> {
        let state = self.read()?;
        Ok(state
            .repositories
            .values()
            .find(|repository| repository.full_name() == full_name)
            .cloned())
    }

    async fn list_repositories(&self, sort: RepositorySort) -> MirrorStoreResult<Vec<Repository>> {
        Ok(self.read()?.sorted(sort, None))
    }

    async fn search(
        &self,
        filter: &RepositoryFilter,
        sort: RepositorySort,
    ) -> MirrorStoreResult<Vec<Repository>> {
        Ok(self.read()?.sorted(sort, Some(filter)))
    }

    async fn delete_repository(&self, id: RepositoryId) -> MirrorStoreResult<()> {
        let mut state = self.write()?;
        let removed = state
            .repositories
            .remove(&id)
            .ok_or(MirrorStoreError::RepositoryNotFound(id))?;
        state.remote_index.remove(&removed.remote_id());
        state.branches.retain(|_, branch| branch.repository_id() != id);
        state
            .sessions
            .retain(|_, session| session.repository_id() != id);
        Ok(())
    }
}

#[async_trait]
impl BranchStore for InMemoryMirrorStore {
    async fn upsert_branch(&self, candidate: &Branch) -> MirrorStoreResult<Branch> {
        let mut state = self.write()?;
        if !state
            .repositories
            .contains_key(&candidate.repository_id())
        {
            return Err(MirrorStoreError::RepositoryNotFound(
                candidate.repository_id(),
            ));
        }

        if let Some(stored) = state.branches.values_mut().find(|branch| {
            branch.repository_id() == candidate.repository_id() && branch.name() == candidate.name()
        }) {
            stored.apply_sync(candidate);
            return Ok(stored.clone());
        }

        state.branches.insert(candidate.id(), candidate.clone());
        Ok(candidate.clone())
    }

    async fn list_branches(&self, repository_id: RepositoryId) -> MirrorStoreResult<Vec<Branch>> {
        let state = self.read()?;
        let mut branches: Vec<Branch> = state
            .branches
            .values()
            .filter(|branch| branch.repository_id() == repository_id)
            .cloned()
            .collect();
        sort_for_display(&mut branches);
        Ok(branches)
    }

    async fn find_branch(
        &self,
        repository_id: RepositoryId,
        name: &BranchName,
    ) -> MirrorStoreResult<Option<Branch>> {
        let state = self.read()?;
        Ok(state
            .branches
            .values()
            .find(|branch| branch.repository_id() == repository_id && branch.name() == name)
            .cloned())
    }

    async fn prune_branches(
        &self,
        repository_id: RepositoryId,
        keep: &[BranchName],
    ) -> MirrorStoreResult<usize> {
        let mut state = self.write()?;
        let stale: Vec<BranchId> = state
            .branches
            .values()
            .filter(|branch| {
                branch.repository_id() == repository_id && !keep.contains(branch.name())
            })
            .map(Branch::id)
            .collect();

        for branch_id in &stale {
            state.branches.remove(branch_id);
        }
        for session in state.sessions.values_mut() {
            if session
                .branch_id()
                .is_some_and(|branch_id| stale.contains(&branch_id))
            {
                session.clear_branch();
            }
        }
        Ok(stale.len())
    }
}
