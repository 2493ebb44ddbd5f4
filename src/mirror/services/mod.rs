//! Service layer for the repository mirror.
//!
//! - [`SyncService`] reconciles remote state into the store and creates
//!   repositories.
//! - [`CatalogService`] answers list, search, and detail queries.
//! - [`DeletionService`] removes a repository everywhere and reports each
//!   stage.

mod catalog;
mod deletion;
mod sync;

pub use catalog::{CatalogError, CatalogResult, CatalogService, RepositoryDetail};
pub use deletion::{DeletionReport, DeletionService, StageOutcome};
pub use sync::{
    BranchSyncSummary, CreateRepositoryRequest, SyncError, SyncOutcome, SyncResult, SyncService,
};
