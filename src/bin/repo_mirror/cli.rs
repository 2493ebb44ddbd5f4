//! Command-line surface for the `repo-mirror` binary.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use repo_mirror::config::DEFAULT_BASE_DIR;
use repo_mirror::mirror::domain::{
    Affiliation, ImportRequest, OrganizationFilter, RepositoryFilter, RepositorySort, SyncScope,
};
use repo_mirror::session::domain::SessionId;

/// Mirror remote repositories into a local catalog and track work sessions.
#[derive(Debug, Parser)]
#[command(name = "repo-mirror", version)]
pub struct Cli {
    /// `PostgreSQL` connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Directory holding local checkouts.
    #[arg(long, env = "REPO_MIRROR_BASE_DIR", default_value = DEFAULT_BASE_DIR)]
    pub base_dir: Utf8PathBuf,

    /// Override for the remote REST API root.
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Page size for remote list requests (1..=100).
    #[arg(long)]
    pub page_size: Option<u8>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch repositories and branches from the remote host.
    Sync(SyncArgs),
    /// Sync, then keep only repositories passing the inclusion toggles.
    Import(ImportArgs),
    /// Create a repository remotely and mirror it.
    Create(CreateArgs),
    /// Delete a repository remotely, locally, and from the catalog.
    Delete {
        /// Qualified `owner/name`.
        full_name: String,
    },
    /// List remote repositories without mirroring them.
    List {
        /// List this user's public repositories instead of the token owner's.
        #[arg(long)]
        username: Option<String>,
    },
    /// Search mirrored repositories.
    Search(SearchArgs),
    /// Show one repository with its branches.
    Show {
        /// Qualified `owner/name`.
        full_name: String,
        /// Also fetch live statistics from the remote host.
        #[arg(long)]
        remote: bool,
    },
    /// Manage work sessions.
    #[command(subcommand)]
    Session(SessionCommand),
}

/// Relationship filters accepted by `sync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AffiliationArg {
    /// Owned repositories.
    Owner,
    /// Organization repositories.
    OrganizationMember,
    /// Collaborations.
    Collaborator,
}

impl From<AffiliationArg> for Affiliation {
    fn from(value: AffiliationArg) -> Self {
        match value {
            AffiliationArg::Owner => Self::Owner,
            AffiliationArg::OrganizationMember => Self::OrganizationMember,
            AffiliationArg::Collaborator => Self::Collaborator,
        }
    }
}

/// Arguments for `sync`.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Affiliations to list; defaults to all three.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub affiliation: Vec<AffiliationArg>,
    /// Also mirror starred repositories.
    #[arg(long)]
    pub starred: bool,
    /// Also mirror public repositories of this user.
    #[arg(long)]
    pub username: Option<String>,
}

impl SyncArgs {
    /// Builds the sync scope.
    pub fn scope(&self) -> SyncScope {
        let mut scope = SyncScope::new().with_starred(self.starred);
        if !self.affiliation.is_empty() {
            scope =
                scope.with_affiliations(self.affiliation.iter().copied().map(Affiliation::from));
        }
        if let Some(username) = &self.username {
            scope = scope.with_username(username.as_str());
        }
        scope
    }
}

/// Arguments for `import`.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Also mirror public repositories of this user.
    #[arg(long)]
    pub username: Option<String>,
    /// Drop private repositories.
    #[arg(long)]
    pub exclude_private: bool,
    /// Drop organization repositories.
    #[arg(long)]
    pub exclude_organization: bool,
    /// Drop repositories the token owner only collaborates on.
    #[arg(long)]
    pub exclude_collaborations: bool,
}

impl ImportArgs {
    /// Builds the import request.
    pub fn request(&self) -> ImportRequest {
        ImportRequest {
            username: self.username.clone(),
            include_private: !self.exclude_private,
            include_organization: !self.exclude_organization,
            include_collaborations: !self.exclude_collaborations,
        }
    }
}

/// Arguments for `create`.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Repository name.
    pub name: String,
    /// Repository description.
    #[arg(long)]
    pub description: Option<String>,
    /// Create a private repository.
    #[arg(long)]
    pub private: bool,
    /// Skip the initial commit.
    #[arg(long)]
    pub no_auto_init: bool,
}

/// Arguments for `search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text matched against name, description, and organization.
    #[arg(long)]
    pub query: Option<String>,
    /// Only private repositories.
    #[arg(long, conflicts_with = "public")]
    pub private: bool,
    /// Only public repositories.
    #[arg(long)]
    pub public: bool,
    /// Only repositories of this organization.
    #[arg(long, conflicts_with = "personal")]
    pub organization: Option<String>,
    /// Only repositories without an organization.
    #[arg(long)]
    pub personal: bool,
    /// Only repositories with this primary language.
    #[arg(long)]
    pub language: Option<String>,
    /// Sort key.
    #[arg(long, default_value = "-updated_at", value_parser = parse_sort)]
    pub sort: RepositorySort,
}

impl SearchArgs {
    /// Builds the search filter.
    pub fn filter(&self) -> RepositoryFilter {
        let mut filter = RepositoryFilter::new();
        if let Some(query) = &self.query {
            filter = filter.with_query(query.as_str());
        }
        if self.private {
            filter = filter.with_private(true);
        } else if self.public {
            filter = filter.with_private(false);
        }
        if let Some(organization) = &self.organization {
            filter = filter.with_organization(OrganizationFilter::Named(organization.clone()));
        } else if self.personal {
            filter = filter.with_organization(OrganizationFilter::Personal);
        }
        if let Some(language) = &self.language {
            filter = filter.with_language(language.as_str());
        }
        filter
    }
}

/// Session operations.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Start a session, closing the repository's active one.
    Start {
        /// Qualified `owner/name`.
        full_name: String,
        /// Branch to pin the session to.
        #[arg(long)]
        branch: Option<String>,
        /// Opening notes.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// End a session.
    End {
        /// Session identifier.
        id: SessionId,
        /// Closing notes appended to the session notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// Replace the notes of an active session.
    Notes {
        /// Session identifier.
        id: SessionId,
        /// New notes.
        notes: String,
    },
    /// Show the active session of a repository.
    Status {
        /// Qualified `owner/name`.
        full_name: String,
    },
    /// List a repository's sessions, most recent first.
    History {
        /// Qualified `owner/name`.
        full_name: String,
    },
}

fn parse_sort(raw: &str) -> Result<RepositorySort, String> {
    RepositorySort::try_from(raw).map_err(|err| err.to_string())
}
