//! Unit tests for the repository mirror.


use crate::mirror::domain::{OwnerKind, RemoteOwner, RemoteRepository};

/// Builds a remote record owned by `owner` with fixed timestamps.
pub(super) fn remote_repository(id: u64, owner: &str, name: &str) -> RemoteRepository {
    RemoteRepository {
        id,
        name: name.to_owned(),
        full_name: Some(format!("{owner}/{name}")),
        description: None,
        html_url: format!("https://github.com/{owner}/{name}"),
        private: false,
        fork: false,
        created_at: "2024-01-02T03:04:05Z".to_owned(),
        updated_at: "2024-06-01T00:00:00Z".to_owned(),
        pushed_at: Some("2024-06-01T00:00:00Z".to_owned()),
        size: 42,
        language: Some("Rust".to_owned()),
        default_branch: Some("main".to_owned()),
        owner: RemoteOwner {
            login: owner.to_owned(),
            kind: OwnerKind::User,
        },
        stargazers_count: 3,
    }
}

/// Builds a remote record owned by an organization account.
pub(super) fn organization_repository(id: u64, organization: &str, name: &str) -> RemoteRepository {
    let mut repository = remote_repository(id, organization, name);
    repository.owner.kind = OwnerKind::Organization;
    repository
}
