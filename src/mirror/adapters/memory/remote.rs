//! Scripted in-memory remote host.

use crate::mirror::{
    domain::{
        Affiliation, NewRemoteRepository, OwnerKind, RemoteBranch, RemoteOwner, RemoteRepository,
        RemoteRepositoryDetails, dedup_by_key,
    },
    ports::{RemoteHost, RemoteHostError, RemoteHostResult},
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// First identifier handed out to repositories created through the fake.
const FIRST_CREATED_ID: u64 = 9_000_000;

/// In-memory remote host adapter.
///
/// Serves repositories, branches, and failures scripted by the test. It
/// never performs network I/O and keeps a log of remote deletions.
#[derive(Debug, Clone)]
pub struct InMemoryRemoteHost {
    state: Arc<RwLock<RemoteState>>,
}

#[derive(Debug, Default)]
struct RemoteState {
    login: String,
    repositories: Vec<(Affiliation, RemoteRepository)>,
    starred: Vec<RemoteRepository>,
    user_repositories: HashMap<String, Vec<RemoteRepository>>,
    branches: HashMap<String, Vec<RemoteBranch>>,
    listing_failure: Option<RemoteHostError>,
    branch_failures: HashMap<String, RemoteHostError>,
    delete_failures: HashMap<String, RemoteHostError>,
    deleted: Vec<String>,
    created: u64,
}

impl RemoteState {
    fn find(&self, full_name: &str) -> Option<&RemoteRepository> {
        self.repositories
            .iter()
            .map(|(_, repository)| repository)
            .chain(&self.starred)
            .chain(self.user_repositories.values().flatten())
            .find(|repository| repository.qualified_name() == full_name)
    }
}

impl InMemoryRemoteHost {
    /// Creates an empty host whose token belongs to `login`.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RemoteState {
                login: login.into(),
                ..RemoteState::default()
            })),
        }
    }

    fn read(&self) -> RemoteHostResult<RwLockReadGuard<'_, RemoteState>> {
        self.state
            .read()
            .map_err(|err| RemoteHostError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RemoteHostResult<RwLockWriteGuard<'_, RemoteState>> {
        self.state
            .write()
            .map_err(|err| RemoteHostError::transport(std::io::Error::other(err.to_string())))
    }

    /// Adds a repository listed under `affiliation`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn add_repository(
        &self,
        affiliation: Affiliation,
        repository: RemoteRepository,
    ) -> RemoteHostResult<()> {
        self.write()?.repositories.push((affiliation, repository));
        Ok(())
    }

    /// Adds a repository starred by the token owner.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn add_starred(&self, repository: RemoteRepository) -> RemoteHostResult<()> {
        self.write()?.starred.push(repository);
        Ok(())
    }

    /// Adds a public repository of another user.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn add_user_repository(
        &self,
        username: impl Into<String>,
        repository: RemoteRepository,
    ) -> RemoteHostResult<()> {
        self.write()?
            .user_repositories
            .entry(username.into())
            .or_default()
            .push(repository);
        Ok(())
    }

    /// Replaces the branch list of `full_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn set_branches(
        &self,
        full_name: impl Into<String>,
        branches: Vec<RemoteBranch>,
    ) -> RemoteHostResult<()> {
        self.write()?.branches.insert(full_name.into(), branches);
        Ok(())
    }

    /// Makes every listing call fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn fail_listings(&self, error: RemoteHostError) -> RemoteHostResult<()> {
        self.write()?.listing_failure = Some(error);
        Ok(())
    }

    /// Makes branch listing for `full_name` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn fail_branches(
        &self,
        full_name: impl Into<String>,
        error: RemoteHostError,
    ) -> RemoteHostResult<()> {
        self.write()?
            .branch_failures
            .insert(full_name.into(), error);
        Ok(())
    }

    /// Makes deletion of `full_name` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn fail_delete(
        &self,
        full_name: impl Into<String>,
        error: RemoteHostError,
    ) -> RemoteHostResult<()> {
        self.write()?
            .delete_failures
            .insert(full_name.into(), error);
        Ok(())
    }

    /// Returns the qualified names deleted so far, in call order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when lock acquisition fails.
    pub fn deleted(&self) -> RemoteHostResult<Vec<String>> {
        Ok(self.read()?.deleted.clone())
    }

    fn listing_guard(state: &RemoteState) -> RemoteHostResult<()> {
        state.listing_failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl RemoteHost for InMemoryRemoteHost {
    async fn authenticated_login(&self) -> RemoteHostResult<String> {
        Ok(self.read()?.login.clone())
    }

    async fn list_repositories(
        &self,
        affiliations: &[Affiliation],
    ) -> RemoteHostResult<Vec<RemoteRepository>> {
        let state = self.read()?;
        Self::listing_guard(&state)?;
        let listed = state
            .repositories
            .iter()
            .filter(|(affiliation, _)| affiliations.contains(affiliation))
            .map(|(_, repository)| repository.clone());
        Ok(dedup_by_key(listed, |repository| Some(repository.id)))
    }

    async fn list_starred(&self) -> RemoteHostResult<Vec<RemoteRepository>> {
        let state = self.read()?;
        Self::listing_guard(&state)?;
        Ok(state.starred.clone())
    }

    async fn list_user_repositories(
        &self,
        username: &str,
    ) -> RemoteHostResult<Vec<RemoteRepository>> {
        let state = self.read()?;
        Self::listing_guard(&state)?;
        Ok(state
            .user_repositories
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_branches(&self, full_name: &str) -> RemoteHostResult<Vec<RemoteBranch>> {
        let state = self.read()?;
        if let Some(error) = state.branch_failures.get(full_name) {
            return Err(error.clone());
        }
        Ok(state.branches.get(full_name).cloned().unwrap_or_default())
    }

    async fn create_repository(
        &self,
        request: &NewRemoteRepository,
    ) -> RemoteHostResult<RemoteRepository> {
        let mut state = self.write()?;
        let full_name = format!("{}/{}", state.login, request.name);
        if state.find(&full_name).is_some() {
            return Err(RemoteHostError::Status {
                status: 422,
                message: format!("name already exists on this account: {}", request.name),
            });
        }

        state.created += 1;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let repository = RemoteRepository {
            id: FIRST_CREATED_ID + state.created,
            name: request.name.as_str().to_owned(),
            full_name: Some(full_name.clone()),
            description: request.description.clone(),
            html_url: format!("https://github.com/{full_name}"),
            private: request.private,
            fork: false,
            created_at: now.clone(),
            updated_at: now.clone(),
            pushed_at: request.auto_init.then_some(now),
            size: 0,
            language: None,
            default_branch: Some("main".to_owned()),
            owner: RemoteOwner {
                login: state.login.clone(),
                kind: OwnerKind::User,
            },
            stargazers_count: 0,
        };

        if request.auto_init {
            let initial = RemoteBranch::new("main", format!("{:040x}", repository.id))
                .with_commit_message("Initial commit");
            state.branches.insert(full_name, vec![initial]);
        }
        state
            .repositories
            .push((Affiliation::Owner, repository.clone()));
        Ok(repository)
    }

    async fn delete_repository(&self, full_name: &str) -> RemoteHostResult<()> {
        let mut state = self.write()?;
        if let Some(error) = state.delete_failures.get(full_name) {
            return Err(error.clone());
        }
        if state.find(full_name).is_none() {
            return Err(RemoteHostError::NotFound(full_name.to_owned()));
        }

        state
            .repositories
            .retain(|(_, repository)| repository.qualified_name() != full_name);
        state
            .starred
            .retain(|repository| repository.qualified_name() != full_name);
        state.branches.remove(full_name);
        state.deleted.push(full_name.to_owned());
        Ok(())
    }

    async fn repository_details(
        &self,
        full_name: &str,
    ) -> RemoteHostResult<RemoteRepositoryDetails> {
        let state = self.read()?;
        let repository = state
            .find(full_name)
            .ok_or_else(|| RemoteHostError::NotFound(full_name.to_owned()))?;
        Ok(RemoteRepositoryDetails {
            stars: repository.stargazers_count,
            forks: 0,
            open_issues: 0,
            watchers: repository.stargazers_count,
            default_branch: repository.default_branch.clone(),
            language: repository.language.clone(),
            created_at: parse_or_epoch(&repository.created_at),
            updated_at: parse_or_epoch(&repository.updated_at),
            pushed_at: repository.pushed_at.as_deref().map(parse_or_epoch),
        })
    }
}

fn parse_or_epoch(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_default()
}
