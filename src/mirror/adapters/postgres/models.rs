//! Diesel row models for repository mirror persistence.

use super::schema::{branches, repositories};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for repository records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = repositories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RepositoryRow {
    /// Internal repository identifier.
    pub id: uuid::Uuid,
    /// Remote host identifier.
    pub remote_id: i64,
    /// Short repository name.
    pub name: String,
    /// Qualified name.
    pub full_name: String,
    /// Description.
    pub description: Option<String>,
    /// Browser URL.
    pub url: String,
    /// Visibility flag.
    pub private: bool,
    /// Fork flag.
    pub fork: bool,
    /// Remote creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Remote update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Remote push timestamp.
    pub pushed_at: Option<DateTime<Utc>>,
    /// Size in kilobytes.
    pub size: i64,
    /// Primary language.
    pub language: Option<String>,
    /// Default branch name.
    pub default_branch: String,
    /// Owning organization.
    pub organization: Option<String>,
    /// Last synchronization timestamp.
    pub last_synced: Option<DateTime<Utc>>,
    /// Local checkout path.
    pub local_path: Option<String>,
}

/// Insert model for repository records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repositories)]
pub struct NewRepositoryRow {
    /// Internal repository identifier.
    pub id: uuid::Uuid,
    /// Remote host identifier.
    pub remote_id: i64,
    /// Mirrored fields.
    #[diesel(embed)]
    pub fields: RepositoryChangeset,
}

/// Mirrored repository fields written on every upsert.
///
/// `None` values overwrite stored values with `NULL`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = repositories)]
#[diesel(treat_none_as_null = true)]
pub struct RepositoryChangeset {
    /// Short repository name.
    pub name: String,
    /// Qualified name.
    pub full_name: String,
    /// Description.
    pub description: Option<String>,
    /// Browser URL.
    pub url: String,
    /// Visibility flag.
    pub private: bool,
    /// Fork flag.
    pub fork: bool,
    /// Remote creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Remote update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Remote push timestamp.
    pub pushed_at: Option<DateTime<Utc>>,
    /// Size in kilobytes.
    pub size: i64,
    /// Primary language.
    pub language: Option<String>,
    /// Default branch name.
    pub default_branch: String,
    /// Owning organization.
    pub organization: Option<String>,
    /// Last synchronization timestamp.
    pub last_synced: Option<DateTime<Utc>>,
    /// Local checkout path.
    pub local_path: Option<String>,
}

/// Query result row for branch records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = branches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BranchRow {
    /// Internal branch identifier.
    pub id: uuid::Uuid,
    /// Owning repository.
    pub repository_id: uuid::Uuid,
    /// Branch name.
    pub name: String,
    /// Default branch flag.
    pub is_default: bool,
    /// Head commit hash.
    pub last_commit_sha: String,
    /// Head commit message.
    pub last_commit_message: Option<String>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for branch records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = branches)]
pub struct NewBranchRow {
    /// Internal branch identifier.
    pub id: uuid::Uuid,
    /// Owning repository.
    pub repository_id: uuid::Uuid,
    /// Branch name.
    pub name: String,
    /// Mirrored fields.
    #[diesel(embed)]
    pub fields: BranchChangeset,
}

/// Mirrored branch fields written on every upsert.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = branches)]
#[diesel(treat_none_as_null = true)]
pub struct BranchChangeset {
    /// Default branch flag.
    pub is_default: bool,
    /// Head commit hash.
    pub last_commit_sha: String,
    /// Head commit message.
    pub last_commit_message: Option<String>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}
