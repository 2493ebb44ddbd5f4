//! Records as reported by the remote code-hosting service.
//!
//! [`RemoteRepository`] mirrors the remote JSON shape so the client can
//! decode list pages directly. Timestamps stay as strings until the sync
//! routine parses them per record.

use super::RepositoryName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner classification reported by the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    /// Personal account.
    User,
    /// Organization account.
    Organization,
    /// Any other account type (bots, enterprises).
    #[serde(other)]
    Other,
}

/// Owner of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOwner {
    /// Account login.
    pub login: String,
    /// Account type.
    #[serde(rename = "type")]
    pub kind: OwnerKind,
}

impl RemoteOwner {
    /// Returns the login when the owner is an organization.
    #[must_use]
    pub fn organization(&self) -> Option<&str> {
        match self.kind {
            OwnerKind::Organization => Some(self.login.as_str()),
            OwnerKind::User | OwnerKind::Other => None,
        }
    }
}

/// Repository record as listed by the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    /// Stable remote identifier.
    pub id: u64,
    /// Short repository name.
    pub name: String,
    /// Qualified `owner/name`, when reported.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Browser URL.
    pub html_url: String,
    /// Visibility flag.
    #[serde(default)]
    pub private: bool,
    /// Fork flag.
    #[serde(default)]
    pub fork: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
    /// Last push timestamp (RFC 3339); absent for empty repositories.
    #[serde(default)]
    pub pushed_at: Option<String>,
    /// Size in kilobytes.
    #[serde(default)]
    pub size: u64,
    /// Primary language.
    #[serde(default)]
    pub language: Option<String>,
    /// Default branch name.
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Owning account.
    pub owner: RemoteOwner,
    /// Star count.
    #[serde(default)]
    pub stargazers_count: u64,
}

impl RemoteRepository {
    /// Returns the `owner/name` path used to address the repository on the
    /// host, built from the owner when the record omits it.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || format!("{}/{}", self.owner.login, self.name),
                ToOwned::to_owned,
            )
    }
}

/// Branch record as listed by the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBranch {
    /// Branch name.
    pub name: String,
    /// Head commit hash.
    pub commit_sha: String,
    /// Head commit message, when it could be resolved.
    pub commit_message: Option<String>,
}

impl RemoteBranch {
    /// Creates a branch record.
    #[must_use]
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_sha: commit_sha.into(),
            commit_message: None,
        }
    }

    /// Sets the head commit message.
    #[must_use]
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = Some(message.into());
        self
    }
}

/// Request payload for creating a repository on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemoteRepository {
    /// Validated repository name.
    pub name: RepositoryName,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the repository is private.
    pub private: bool,
    /// Whether the host should create an initial commit.
    pub auto_init: bool,
}

/// Extended statistics for a single remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepositoryDetails {
    /// Star count.
    pub stars: u64,
    /// Fork count.
    pub forks: u64,
    /// Open issue count.
    pub open_issues: u64,
    /// Watcher count.
    pub watchers: u64,
    /// Default branch name.
    pub default_branch: Option<String>,
    /// Primary language.
    pub language: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last push timestamp.
    pub pushed_at: Option<DateTime<Utc>>,
}
