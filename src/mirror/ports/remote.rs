//! Remote code-hosting port.

use crate::mirror::domain::{
    Affiliation, NewRemoteRepository, RemoteBranch, RemoteRepository, RemoteRepositoryDetails,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for remote host operations.
pub type RemoteHostResult<T> = Result<T, RemoteHostError>;

/// Read and write access to the remote code-hosting service.
///
/// Listing operations return every page, de-duplicated by remote id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Returns the login of the token owner.
    async fn authenticated_login(&self) -> RemoteHostResult<String>;

    /// Lists repositories visible to the token owner under `affiliations`.
    async fn list_repositories(
        &self,
        affiliations: &[Affiliation],
    ) -> RemoteHostResult<Vec<RemoteRepository>>;

    /// Lists repositories starred by the token owner.
    async fn list_starred(&self) -> RemoteHostResult<Vec<RemoteRepository>>;

    /// Lists public repositories of another user.
    async fn list_user_repositories(&self, username: &str)
    -> RemoteHostResult<Vec<RemoteRepository>>;

    /// Lists branches of `full_name` with their head commit details.
    async fn list_branches(&self, full_name: &str) -> RemoteHostResult<Vec<RemoteBranch>>;

    /// Creates a repository owned by the token owner.
    async fn create_repository(
        &self,
        request: &NewRemoteRepository,
    ) -> RemoteHostResult<RemoteRepository>;

    /// Deletes `full_name` on the remote host.
    async fn delete_repository(&self, full_name: &str) -> RemoteHostResult<()>;

    /// Returns extended statistics for `full_name`.
    async fn repository_details(&self, full_name: &str)
    -> RemoteHostResult<RemoteRepositoryDetails>;
}

/// Errors returned by remote host adapters.
#[derive(Debug, Clone, Error)]
pub enum RemoteHostError {
    /// The request quota is exhausted.
    #[error("rate limit exceeded, resets in {}s", retry_after.as_secs())]
    RateLimited {
        /// Time until the quota resets, zero when already past.
        retry_after: Duration,
        /// Reset instant reported by the host, when parseable.
        reset_at: Option<DateTime<Utc>>,
    },

    /// The access token was rejected.
    #[error("remote host rejected the access token")]
    Unauthorized,

    /// The requested resource does not exist.
    #[error("remote resource not found: {0}")]
    NotFound(String),

    /// The host answered with an unexpected status.
    #[error("remote host returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The request could not be sent or the response not received.
    #[error("remote transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The response body did not decode.
    #[error("remote response decode error: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteHostError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a decode error.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }
}
