//! Port contracts for work session persistence.

pub mod store;

pub use store::{SessionStart, SessionStore, SessionStoreError, SessionStoreResult};
