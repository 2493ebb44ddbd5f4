//! Port contracts for the repository mirror.
//!
//! Ports define infrastructure-agnostic interfaces for persistence, the
//! remote code-hosting service, and local workspace cleanup.

pub mod remote;
pub mod store;
pub mod workspace;

pub use remote::{RemoteHost, RemoteHostError, RemoteHostResult};
pub use store::{BranchStore, MirrorStoreError, MirrorStoreResult, RepositoryStore};
pub use workspace::{RemovalOutcome, WorkspaceCleaner, WorkspaceError};
