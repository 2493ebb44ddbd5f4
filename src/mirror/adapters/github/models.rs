//! Wire payloads exchanged with the GitHub REST API.

use crate::mirror::domain::{NewRemoteRepository, RemoteRepositoryDetails};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /user` response.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct AuthenticatedUser {
    pub(super) login: String,
}

/// Element of `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct BranchRecord {
    pub(super) name: String,
    pub(super) commit: CommitPointer,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CommitPointer {
    pub(super) sha: String,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}` response.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct CommitRecord {
    pub(super) commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CommitDetail {
    #[serde(default)]
    pub(super) message: Option<String>,
}

/// `POST /user/repos` request body.
#[derive(Debug, Clone, Serialize)]
pub(super) struct CreateRepositoryBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    private: bool,
    auto_init: bool,
}

impl<'a> From<&'a NewRemoteRepository> for CreateRepositoryBody<'a> {
    fn from(request: &'a NewRemoteRepository) -> Self {
        Self {
            name: request.name.as_str(),
            description: request.description.as_deref(),
            private: request.private,
            auto_init: request.auto_init,
        }
    }
}

/// `GET /repos/{owner}/{repo}` statistics.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct RepositoryDetailsRecord {
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    subscribers_count: Option<u64>,
    #[serde(default)]
    watchers_count: u64,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    language: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
}

impl From<RepositoryDetailsRecord> for RemoteRepositoryDetails {
    fn from(record: RepositoryDetailsRecord) -> Self {
        Self {
            stars: record.stargazers_count,
            forks: record.forks_count,
            open_issues: record.open_issues_count,
            watchers: record.subscribers_count.unwrap_or(record.watchers_count),
            default_branch: record.default_branch,
            language: record.language,
            created_at: record.created_at,
            updated_at: record.updated_at,
            pushed_at: record.pushed_at,
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct ErrorBody {
    pub(super) message: String,
}
