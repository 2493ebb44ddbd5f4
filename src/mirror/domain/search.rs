//! Search filters and ordering for the local repository catalog.

use super::{ParseRepositorySortError, Repository};
use std::cmp::Ordering;
use std::fmt;

/// Organization criterion for repository search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationFilter {
    /// Repositories owned by the named organization (case-insensitive).
    Named(String),
    /// Repositories with no owning organization.
    Personal,
}

/// Conjunctive search filter; omitted criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryFilter {
    query: Option<String>,
    private: Option<bool>,
    organization: Option<OrganizationFilter>,
    language: Option<String>,
}

impl RepositoryFilter {
    /// Creates a filter that matches every repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query matched against name, description, and
    /// organization. Blank queries are ignored.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let raw = query.into();
        let trimmed = raw.trim();
        self.query = (!trimmed.is_empty()).then(|| trimmed.to_lowercase());
        self
    }

    /// Restricts results by visibility.
    #[must_use]
    pub const fn with_private(mut self, private: bool) -> Self {
        self.private = Some(private);
        self
    }

    /// Restricts results by organization.
    #[must_use]
    pub fn with_organization(mut self, organization: OrganizationFilter) -> Self {
        self.organization = Some(organization);
        self
    }

    /// Restricts results to one primary language (case-insensitive).
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let raw = language.into();
        let trimmed = raw.trim();
        self.language = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Returns the normalized query.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the visibility criterion.
    #[must_use]
    pub const fn private(&self) -> Option<bool> {
        self.private
    }

    /// Returns the organization criterion.
    #[must_use]
    pub const fn organization(&self) -> Option<&OrganizationFilter> {
        self.organization.as_ref()
    }

    /// Returns the language criterion.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns whether `repository` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, repository: &Repository) -> bool {
        self.matches_query(repository)
            && self
                .private
                .is_none_or(|private| repository.is_private() == private)
            && self.matches_organization(repository)
            && self.language.as_deref().is_none_or(|language| {
                repository
                    .snapshot()
                    .language()
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(language))
            })
    }

    fn matches_query(&self, repository: &Repository) -> bool {
        let Some(query) = self.query.as_deref() else {
            return true;
        };
        let contains = |value: &str| value.to_lowercase().contains(query);
        let snapshot = repository.snapshot();
        contains(snapshot.name())
            || snapshot.description().is_some_and(contains)
            || snapshot.organization().is_some_and(contains)
    }

    fn matches_organization(&self, repository: &Repository) -> bool {
        match &self.organization {
            None => true,
            Some(OrganizationFilter::Personal) => repository.organization().is_none(),
            Some(OrganizationFilter::Named(name)) => repository
                .organization()
                .is_some_and(|organization| organization.eq_ignore_ascii_case(name)),
        }
    }
}

/// Ordering applied to catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositorySort {
    /// Most recently updated first.
    #[default]
    UpdatedDesc,
    /// Least recently updated first.
    UpdatedAsc,
    /// Name ascending.
    NameAsc,
    /// Name descending.
    NameDesc,
    /// Language ascending; repositories without a language last.
    LanguageAsc,
    /// Language descending; repositories without a language first.
    LanguageDesc,
}

impl RepositorySort {
    /// Returns the sort key in `[-]field` form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdatedDesc => "-updated_at",
            Self::UpdatedAsc => "updated_at",
            Self::NameAsc => "name",
            Self::NameDesc => "-name",
            Self::LanguageAsc => "language",
            Self::LanguageDesc => "-language",
        }
    }

    /// Compares two repositories under this ordering.
    ///
    /// Ties fall back to the qualified name so results are stable across
    /// adapters.
    #[must_use]
    pub fn compare(self, left: &Repository, right: &Repository) -> Ordering {
        let primary = match self {
            Self::UpdatedDesc => right
                .snapshot()
                .updated_at()
                .cmp(&left.snapshot().updated_at()),
            Self::UpdatedAsc => left
                .snapshot()
                .updated_at()
                .cmp(&right.snapshot().updated_at()),
            Self::NameAsc => left.name().cmp(right.name()),
            Self::NameDesc => right.name().cmp(left.name()),
            Self::LanguageAsc => compare_language(left, right),
            Self::LanguageDesc => compare_language(right, left),
        };
        primary.then_with(|| left.full_name().cmp(right.full_name()))
    }

    /// Sorts `repositories` in place under this ordering.
    pub fn sort(self, repositories: &mut [Repository]) {
        repositories.sort_by(|left, right| self.compare(left, right));
    }
}

fn compare_language(left: &Repository, right: &Repository) -> Ordering {
    match (left.snapshot().language(), right.snapshot().language()) {
        (Some(lhs), Some(rhs)) => lhs.cmp(rhs),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl TryFrom<&str> for RepositorySort {
    type Error = ParseRepositorySortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "-updated_at" => Ok(Self::UpdatedDesc),
            "updated_at" => Ok(Self::UpdatedAsc),
            "name" => Ok(Self::NameAsc),
            "-name" => Ok(Self::NameDesc),
            "language" => Ok(Self::LanguageAsc),
            "-language" => Ok(Self::LanguageDesc),
            other => Err(ParseRepositorySortError(other.to_owned())),
        }
    }
}

impl fmt::Display for RepositorySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
