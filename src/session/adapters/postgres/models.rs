//! Diesel row models for session persistence.

use crate::mirror::adapters::postgres::schema::sessions;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for session records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Session identifier.
    pub id: uuid::Uuid,
    /// Owning repository.
    pub repository_id: uuid::Uuid,
    /// Referenced branch.
    pub branch_id: Option<uuid::Uuid>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// End timestamp.
    pub ended_at: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
    /// Free-form notes.
    pub notes: String,
    /// Workspace state JSON payload.
    pub workspace: Value,
}

/// Mutable session fields written on update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sessions)]
#[diesel(treat_none_as_null = true)]
pub struct SessionChangeset {
    /// Referenced branch.
    pub branch_id: Option<uuid::Uuid>,
    /// End timestamp.
    pub ended_at: Option<DateTime<Utc>>,
    /// Active flag.
    pub active: bool,
    /// Free-form notes.
    pub notes: String,
    /// Workspace state JSON payload.
    pub workspace: Value,
}
