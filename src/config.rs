//! Explicit configuration for the remote API client and local workspace.
//!
//! The access token is passed into [`MirrorConfig::new`] rather than read
//! from ambient process state. [`MirrorConfig::from_env`] remains available
//! for binaries and reads the environment exactly once.

use camino::{Utf8Path, Utf8PathBuf};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default REST API root for the remote code-hosting service.
pub const DEFAULT_API_URL: &str = "https://api.github.com/";

/// Default directory under which repositories are checked out locally.
pub const DEFAULT_BASE_DIR: &str = "repositories";

/// Largest page size accepted by the remote API.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Default HTTP timeout for remote calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variables consulted for the access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Errors raised while building configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No usable access token was supplied.
    #[error("remote API access token is not set (checked GITHUB_ACCESS_TOKEN, GITHUB_TOKEN)")]
    MissingAccessToken,

    /// The API base URL could not be parsed.
    #[error("invalid remote API URL '{url}': {reason}")]
    InvalidApiUrl {
        /// Rejected input.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The requested page size is outside `1..=100`.
    #[error("invalid page size {0}, expected 1..=100")]
    InvalidPageSize(u8),
}

/// Configuration shared by the remote client and the deletion routine.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    access_token: SecretString,
    api_url: Url,
    base_dir: Utf8PathBuf,
    page_size: u8,
    timeout: Duration,
}

impl MirrorConfig {
    /// Creates configuration from an explicit access token and defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAccessToken`] when the token is blank.
    pub fn new(access_token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = access_token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }

        Ok(Self {
            access_token: SecretString::from(trimmed.to_owned()),
            api_url: parse_api_url(DEFAULT_API_URL)?,
            base_dir: Utf8PathBuf::from(DEFAULT_BASE_DIR),
            page_size: MAX_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Creates configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAccessToken`] when neither token
    /// variable is set to a non-blank value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration using a caller-supplied variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingAccessToken`] when no lookup yields a
    /// non-blank token.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = TOKEN_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;
        Self::new(token)
    }

    /// Overrides the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when the URL does not parse.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }

    /// Overrides the local workspace base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<Utf8PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Overrides the page size used for list requests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPageSize`] when the value is zero or
    /// above [`MAX_PAGE_SIZE`].
    pub fn with_page_size(mut self, page_size: u8) -> Result<Self, ConfigError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Overrides the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Returns the API base URL. Always ends with a slash.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the local workspace base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Utf8Path {
        &self.base_dir
    }

    /// Returns the page size for list requests.
    #[must_use]
    pub const fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Returns the HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|err| ConfigError::InvalidApiUrl {
        url: raw.to_owned(),
        reason: err.to_string(),
    })
}
