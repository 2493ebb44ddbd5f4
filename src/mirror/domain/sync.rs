//! Synchronization scope, import options, and run summaries.

use super::Repository;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Relationship between the token owner and a listed repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affiliation {
    /// Repositories owned by the token owner.
    Owner,
    /// Repositories reachable through organization membership.
    OrganizationMember,
    /// Repositories the token owner collaborates on.
    Collaborator,
}

impl Affiliation {
    /// Every affiliation, in request order.
    pub const ALL: [Self; 3] = [Self::Owner, Self::OrganizationMember, Self::Collaborator];

    /// Returns the query-string value understood by the remote host.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::OrganizationMember => "organization_member",
            Self::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which remote listings a sync run fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScope {
    affiliations: Vec<Affiliation>,
    include_starred: bool,
    username: Option<String>,
}

impl Default for SyncScope {
    fn default() -> Self {
        Self {
            affiliations: Affiliation::ALL.to_vec(),
            include_starred: false,
            username: None,
        }
    }
}

impl SyncScope {
    /// Creates the default scope: all three affiliations, no extras.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the affiliation set.
    #[must_use]
    pub fn with_affiliations(
        mut self,
        affiliations: impl IntoIterator<Item = Affiliation>,
    ) -> Self {
        self.affiliations = affiliations.into_iter().collect();
        self
    }

    /// Also fetches repositories starred by the token owner.
    #[must_use]
    pub const fn with_starred(mut self, include_starred: bool) -> Self {
        self.include_starred = include_starred;
        self
    }

    /// Also fetches public repositories of `username` when it differs from
    /// the token owner. Blank values are ignored.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        let raw = username.into();
        let trimmed = raw.trim();
        self.username = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Returns the affiliation set.
    #[must_use]
    pub fn affiliations(&self) -> &[Affiliation] {
        &self.affiliations
    }

    /// Returns whether starred repositories are fetched.
    #[must_use]
    pub const fn include_starred(&self) -> bool {
        self.include_starred
    }

    /// Returns the extra username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Options for the import flow, a filtered sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Extra username whose public repositories are fetched.
    pub username: Option<String>,
    /// Keep private repositories.
    pub include_private: bool,
    /// Keep organization repositories.
    pub include_organization: bool,
    /// Keep repositories the token owner only collaborates on.
    pub include_collaborations: bool,
}

impl Default for ImportRequest {
    fn default() -> Self {
        Self {
            username: None,
            include_private: true,
            include_organization: true,
            include_collaborations: true,
        }
    }
}

impl ImportRequest {
    /// Returns the sync scope the import runs with.
    #[must_use]
    pub fn scope(&self) -> SyncScope {
        self.username
            .as_deref()
            .map_or_else(SyncScope::new, |username| {
                SyncScope::new().with_username(username)
            })
    }

    /// Returns whether a synced repository survives the import filters.
    ///
    /// `login` is the token owner's login; excluding collaborations keeps
    /// repositories whose qualified name contains it, plus organization
    /// repositories when those are included.
    #[must_use]
    pub fn keeps(&self, repository: &Repository, login: &str) -> bool {
        if !self.include_private && repository.is_private() {
            return false;
        }
        let is_organization = repository.organization().is_some();
        if !self.include_organization && is_organization {
            return false;
        }
        if !self.include_collaborations {
            let owned = !login.is_empty() && repository.full_name().contains(login);
            return owned || (self.include_organization && is_organization);
        }
        true
    }
}

/// Counts reported at the end of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Repositories successfully upserted.
    pub total: usize,
    /// Private repositories among them.
    pub private: usize,
    /// Organization repositories among them.
    pub organization: usize,
}

impl SyncSummary {
    /// Tallies a list of synced repositories.
    #[must_use]
    pub fn from_repositories(repositories: &[Repository]) -> Self {
        repositories
            .iter()
            .fold(Self::default(), |mut summary, repository| {
                summary.total += 1;
                if repository.is_private() {
                    summary.private += 1;
                }
                if repository.organization().is_some() {
                    summary.organization += 1;
                }
                summary
            })
    }
}

/// Removes later duplicates by key, keeping first-seen order.
///
/// Items for which `key` returns `None` are always kept.
///
/// # Examples
///
///     use repo_mirror::mirror::domain::dedup_by_key;
///
///     let items = vec![(Some(1), "a"), (Some(2), "b"), (Some(1), "c"), (None, "d")];
///     let unique = dedup_by_key(items, |item| item.0);
///     assert_eq!(unique, vec![(Some(1), "a"), (Some(2), "b"), (None, "d")]);
pub fn dedup_by_key<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> Option<K>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| key(item).is_none_or(|value| seen.insert(value)))
        .collect()
}
