//! Domain model for the repository mirror.
//!
//! Repositories are keyed by the remote host's stable identifier and carry
//! a snapshot of mirrored fields that is overwritten on every sync. Branches
//! are keyed by `(repository, name)`. Infrastructure concerns stay outside
//! this module.

mod branch;
mod error;
mod ids;
mod remote;
mod repository;
mod search;
mod sync;
mod workspace;

pub use branch::{Branch, BranchName, PersistedBranchData, sort_for_display};
pub use error::{MirrorDomainError, ParseRepositorySortError};
pub use ids::{BranchId, RemoteRepositoryId, RepositoryId, RepositoryName};
pub use remote::{
    NewRemoteRepository, OwnerKind, RemoteBranch, RemoteOwner, RemoteRepository,
    RemoteRepositoryDetails,
};
pub use repository::{DEFAULT_BRANCH_NAME, Repository, RepositorySnapshot};
pub use search::{OrganizationFilter, RepositoryFilter, RepositorySort};
pub use sync::{Affiliation, ImportRequest, SyncScope, SyncSummary, dedup_by_key};
pub use workspace::{
    CLONED_SUBDIR, LOCAL_SUBDIR, deletion_candidates, relative_to_base, repository_local_path,
};
