//! Error types for mirror domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing mirror domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MirrorDomainError {
    /// The remote identifier is zero or exceeds the storage range.
    #[error("invalid remote repository id {0}, expected 1..=i64::MAX")]
    InvalidRemoteId(u64),

    /// The repository name is empty after trimming.
    #[error("repository name must not be empty")]
    EmptyRepositoryName,

    /// The repository name exceeds the accepted length.
    #[error("repository name '{0}' exceeds 100 characters")]
    RepositoryNameTooLong(String),

    /// The repository name contains unsupported characters.
    #[error("invalid repository name '{0}', expected letters, digits, '.', '_' or '-'")]
    InvalidRepositoryName(String),

    /// The branch name is empty after trimming.
    #[error("branch name must not be empty")]
    EmptyBranchName,

    /// The branch name exceeds the storage limit.
    #[error("branch name '{0}' exceeds 255 characters")]
    BranchNameTooLong(String),

    /// A remote timestamp did not parse as RFC 3339.
    #[error("invalid {field} timestamp '{value}'")]
    InvalidTimestamp {
        /// Name of the remote field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },

    /// The repository size does not fit the storage column.
    #[error("repository size {0} exceeds the storage range")]
    SizeOutOfRange(u64),
}

/// Error returned while parsing a sort key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown repository sort key: {0}")]
pub struct ParseRepositorySortError(pub String);
