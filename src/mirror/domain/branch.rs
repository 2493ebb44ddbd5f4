//! Branch records mirrored for each repository.

use super::{BranchId, MirrorDomainError, RemoteBranch, RepositoryId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a branch name stored in a `VARCHAR(255)` column.
const MAX_BRANCH_NAME_LENGTH: usize = 255;

/// Validated branch name, unique within its repository.
///
/// # Examples
///
///     use repo_mirror::mirror::domain::BranchName;
///
///     let name = BranchName::new("feature/sync").expect("valid");
///     assert_eq!(name.as_str(), "feature/sync");
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::EmptyBranchName`] when the value is blank
    /// or [`MirrorDomainError::BranchNameTooLong`] above 255 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, MirrorDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(MirrorDomainError::EmptyBranchName);
        }
        if normalized.len() > MAX_BRANCH_NAME_LENGTH {
            return Err(MirrorDomainError::BranchNameTooLong(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Branch aggregate keyed by `(repository, name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    id: BranchId,
    repository_id: RepositoryId,
    name: BranchName,
    is_default: bool,
    last_commit_sha: String,
    last_commit_message: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBranchData {
    /// Persisted branch identifier.
    pub id: BranchId,
    /// Owning repository.
    pub repository_id: RepositoryId,
    /// Branch name.
    pub name: BranchName,
    /// Whether this is the repository's default branch.
    pub is_default: bool,
    /// Head commit hash.
    pub last_commit_sha: String,
    /// Head commit message.
    pub last_commit_message: Option<String>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Branch {
    /// Builds a branch record from a remote branch.
    ///
    /// The default flag is set by comparing the branch name with the
    /// repository's default branch.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError`] when the remote branch name is invalid.
    pub fn from_remote(
        repository_id: RepositoryId,
        remote: &RemoteBranch,
        default_branch: &str,
        clock: &impl Clock,
    ) -> Result<Self, MirrorDomainError> {
        let name = BranchName::new(remote.name.clone())?;
        Ok(Self {
            id: BranchId::new(),
            repository_id,
            is_default: name.as_str() == default_branch,
            name,
            last_commit_sha: remote.commit_sha.clone(),
            last_commit_message: remote.commit_message.clone(),
            updated_at: clock.utc(),
        })
    }

    /// Reconstructs a branch from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBranchData) -> Self {
        Self {
            id: data.id,
            repository_id: data.repository_id,
            name: data.name,
            is_default: data.is_default,
            last_commit_sha: data.last_commit_sha,
            last_commit_message: data.last_commit_message,
            updated_at: data.updated_at,
        }
    }

    /// Overwrites the mirrored fields from another record with the same key.
    pub fn apply_sync(&mut self, other: &Self) {
        self.is_default = other.is_default;
        self.last_commit_sha.clone_from(&other.last_commit_sha);
        self.last_commit_message.clone_from(&other.last_commit_message);
        self.updated_at = other.updated_at;
    }

    /// Returns the branch identifier.
    #[must_use]
    pub const fn id(&self) -> BranchId {
        self.id
    }

    /// Returns the owning repository.
    #[must_use]
    pub const fn repository_id(&self) -> RepositoryId {
        self.repository_id
    }

    /// Returns the branch name.
    #[must_use]
    pub const fn name(&self) -> &BranchName {
        &self.name
    }

    /// Returns whether this is the default branch.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns the head commit hash.
    #[must_use]
    pub fn last_commit_sha(&self) -> &str {
        &self.last_commit_sha
    }

    /// Returns the head commit message.
    #[must_use]
    pub fn last_commit_message(&self) -> Option<&str> {
        self.last_commit_message.as_deref()
    }

    /// Returns the last write timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Orders branches for display: default branch first, then by name.
pub fn sort_for_display(branches: &mut [Branch]) {
    branches.sort_by(|left, right| {
        right
            .is_default
            .cmp(&left.is_default)
            .then_with(|| left.name.cmp(&right.name))
    });
}
