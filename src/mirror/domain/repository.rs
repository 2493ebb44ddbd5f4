//! Repository aggregate root and its mirrored snapshot.

use super::{MirrorDomainError, RemoteRepository, RemoteRepositoryId, RepositoryId};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Default branch assumed when the remote host reports none.
pub const DEFAULT_BRANCH_NAME: &str = "main";

/// Mirrored repository fields, overwritten wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySnapshot {
    remote_id: RemoteRepositoryId,
    name: String,
    full_name: String,
    description: Option<String>,
    url: String,
    private: bool,
    fork: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pushed_at: Option<DateTime<Utc>>,
    size: u64,
    language: Option<String>,
    default_branch: String,
    organization: Option<String>,
    local_path: Option<Utf8PathBuf>,
}

impl RepositorySnapshot {
    /// Creates a snapshot with required fields and defaults elsewhere.
    ///
    /// The qualified name defaults to `name`, and the default branch to
    /// [`DEFAULT_BRANCH_NAME`].
    #[must_use]
    pub fn new(
        remote_id: RemoteRepositoryId,
        name: impl Into<String>,
        url: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let repository_name = name.into();
        Self {
            remote_id,
            full_name: repository_name.clone(),
            name: repository_name,
            description: None,
            url: url.into(),
            private: false,
            fork: false,
            created_at,
            updated_at,
            pushed_at: None,
            size: 0,
            language: None,
            default_branch: DEFAULT_BRANCH_NAME.to_owned(),
            organization: None,
            local_path: None,
        }
    }

    /// Builds a snapshot from a remote record.
    ///
    /// Parses the three remote timestamps and attributes the repository to
    /// an organization only when the owner is an organization account.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError`] when the identifier is out of range or a
    /// timestamp does not parse.
    pub fn from_remote(
        remote: &RemoteRepository,
        local_path: Option<Utf8PathBuf>,
    ) -> Result<Self, MirrorDomainError> {
        let remote_id = RemoteRepositoryId::new(remote.id)?;
        let created_at = parse_timestamp("created_at", &remote.created_at)?;
        let updated_at = parse_timestamp("updated_at", &remote.updated_at)?;
        let pushed_at = remote
            .pushed_at
            .as_deref()
            .map(|value| parse_timestamp("pushed_at", value))
            .transpose()?;

        let mut snapshot = Self::new(
            remote_id,
            remote.name.clone(),
            remote.html_url.clone(),
            created_at,
            updated_at,
        )
        .with_full_name(remote.full_name.clone().unwrap_or_default())
        .private(remote.private)
        .fork(remote.fork)
        .with_size(remote.size);

        snapshot.pushed_at = pushed_at;
        snapshot.description = remote.description.as_deref().and_then(non_blank);
        snapshot.language = remote.language.as_deref().and_then(non_blank);
        if let Some(default_branch) = remote.default_branch.as_deref().and_then(non_blank) {
            snapshot.default_branch = default_branch;
        }
        snapshot.organization = remote.owner.organization().map(ToOwned::to_owned);
        snapshot.local_path = local_path;
        Ok(snapshot)
    }

    /// Sets the qualified name; blank values keep the short name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        if let Some(value) = non_blank(full_name) {
            self.full_name = value;
        }
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description);
        self
    }

    /// Sets the visibility flag.
    #[must_use]
    pub const fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Sets the fork flag.
    #[must_use]
    pub const fn fork(mut self, fork: bool) -> Self {
        self.fork = fork;
        self
    }

    /// Sets the last push timestamp.
    #[must_use]
    pub const fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    /// Sets the size in kilobytes.
    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Sets the primary language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = non_blank(language);
        self
    }

    /// Sets the default branch name.
    #[must_use]
    pub fn with_default_branch(mut self, default_branch: impl Into<String>) -> Self {
        if let Some(value) = non_blank(default_branch) {
            self.default_branch = value;
        }
        self
    }

    /// Sets the owning organization.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = non_blank(organization);
        self
    }

    /// Sets the local checkout path.
    #[must_use]
    pub fn with_local_path(mut self, local_path: impl Into<Utf8PathBuf>) -> Self {
        self.local_path = Some(local_path.into());
        self
    }

    /// Returns the remote identifier.
    #[must_use]
    pub const fn remote_id(&self) -> RemoteRepositoryId {
        self.remote_id
    }

    /// Returns the short name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the browser URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the visibility flag.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.private
    }

    /// Returns the fork flag.
    #[must_use]
    pub const fn is_fork(&self) -> bool {
        self.fork
    }

    /// Returns the remote creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the remote update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the remote push timestamp.
    #[must_use]
    pub const fn pushed_at(&self) -> Option<DateTime<Utc>> {
        self.pushed_at
    }

    /// Returns the size in kilobytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Returns the primary language.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the default branch name.
    #[must_use]
    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// Returns the local checkout path.
    #[must_use]
    pub fn local_path(&self) -> Option<&Utf8Path> {
        self.local_path.as_deref()
    }
}

/// Repository aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    id: RepositoryId,
    snapshot: RepositorySnapshot,
    last_synced: Option<DateTime<Utc>>,
}

impl Repository {
    /// Creates a freshly synchronized repository record.
    #[must_use]
    pub fn synced(snapshot: RepositorySnapshot, clock: &impl Clock) -> Self {
        Self {
            id: RepositoryId::new(),
            snapshot,
            last_synced: Some(clock.utc()),
        }
    }

    /// Reconstructs a repository from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: RepositoryId,
        snapshot: RepositorySnapshot,
        last_synced: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            snapshot,
            last_synced,
        }
    }

    /// Overwrites every mirrored field, keeping the local identifier.
    pub fn apply_sync(&mut self, other: &Self) {
        self.snapshot = other.snapshot.clone();
        self.last_synced = other.last_synced;
    }

    /// Returns the local identifier.
    #[must_use]
    pub const fn id(&self) -> RepositoryId {
        self.id
    }

    /// Returns the mirrored fields.
    #[must_use]
    pub const fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }

    /// Returns the remote identifier.
    #[must_use]
    pub const fn remote_id(&self) -> RemoteRepositoryId {
        self.snapshot.remote_id
    }

    /// Returns the short name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.snapshot.name()
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.snapshot.full_name()
    }

    /// Returns the visibility flag.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.snapshot.private
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        self.snapshot.organization()
    }

    /// Returns the local checkout path.
    #[must_use]
    pub fn local_path(&self) -> Option<&Utf8Path> {
        self.snapshot.local_path()
    }

    /// Returns the last synchronization timestamp.
    #[must_use]
    pub const fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, MirrorDomainError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| MirrorDomainError::InvalidTimestamp {
            field,
            value: value.to_owned(),
        })
}

fn non_blank(value: impl Into<String>) -> Option<String> {
    let owned = value.into();
    let trimmed = owned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
