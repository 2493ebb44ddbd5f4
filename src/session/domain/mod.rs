//! Domain model for per-repository work sessions.
//!
//! At most one session per repository is active. Starting a session
//! supersedes the previous active one; ending it records the end time and
//! optional closing notes.

mod error;
mod ids;
mod session;
mod workspace;

pub use error::SessionDomainError;
pub use ids::SessionId;
pub use session::{PersistedSessionData, Session, SessionSummary};
pub use workspace::{CursorPosition, GitStatus, WorkspaceState};
