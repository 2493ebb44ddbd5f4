//! Error types for session state transitions.

use super::SessionId;
use thiserror::Error;

/// Errors returned by session state transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionDomainError {
    /// The session has already ended.
    #[error("session {0} has already ended")]
    AlreadyEnded(SessionId),

    /// The session is not active and cannot be mutated.
    #[error("session {0} is not active")]
    NotActive(SessionId),
}
