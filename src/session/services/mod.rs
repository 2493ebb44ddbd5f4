//! Service layer for work sessions.
//!
//! Provides [`SessionLifecycleService`] and the [`SessionSummaryCache`] it
//! invalidates on every mutation.

mod cache;
mod lifecycle;

pub use cache::SessionSummaryCache;
pub use lifecycle::{
    SessionLifecycleError, SessionLifecycleResult, SessionLifecycleService, StartSessionRequest,
};
