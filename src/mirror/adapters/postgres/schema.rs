//! Diesel schema for repository mirror persistence.

diesel::table! {
    /// Mirrored repository records.
    repositories (id) {
        /// Internal repository identifier.
        id -> Uuid,
        /// Remote host identifier, unique.
        remote_id -> Int8,
        /// Short repository name.
        #[max_length = 255]
        name -> Varchar,
        /// Qualified `owner/name`.
        #[max_length = 255]
        full_name -> Varchar,
        /// Free-form description.
        description -> Nullable<Text>,
        /// Browser URL.
        #[max_length = 500]
        url -> Varchar,
        /// Visibility flag.
        private -> Bool,
        /// Fork flag.
        fork -> Bool,
        /// Remote creation timestamp.
        created_at -> Timestamptz,
        /// Remote update timestamp.
        updated_at -> Timestamptz,
        /// Remote push timestamp.
        pushed_at -> Nullable<Timestamptz>,
        /// Size in kilobytes.
        size -> Int8,
        /// Primary language.
        #[max_length = 100]
        language -> Nullable<Varchar>,
        /// Default branch name.
        #[max_length = 255]
        default_branch -> Varchar,
        /// Owning organization.
        #[max_length = 255]
        organization -> Nullable<Varchar>,
        /// Last synchronization timestamp.
        last_synced -> Nullable<Timestamptz>,
        /// Local checkout path.
        local_path -> Nullable<Text>,
    }
}

diesel::table! {
    /// Mirrored branch records.
    branches (id) {
        /// Internal branch identifier.
        id -> Uuid,
        /// Owning repository.
        repository_id -> Uuid,
        /// Branch name, unique per repository.
        #[max_length = 255]
        name -> Varchar,
        /// Default branch flag.
        is_default -> Bool,
        /// Head commit hash.
        #[max_length = 64]
        last_commit_sha -> Varchar,
        /// Head commit message.
        last_commit_message -> Nullable<Text>,
        /// Last write timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Work session records.
    sessions (id) {
        /// Session identifier.
        id -> Uuid,
        /// Owning repository.
        repository_id -> Uuid,
        /// Referenced branch.
        branch_id -> Nullable<Uuid>,
        /// Start timestamp.
        started_at -> Timestamptz,
        /// End timestamp.
        ended_at -> Nullable<Timestamptz>,
        /// Active flag.
        active -> Bool,
        /// Free-form notes.
        notes -> Text,
        /// Captured workspace state as JSONB.
        workspace -> Jsonb,
    }
}

diesel::joinable!(branches -> repositories (repository_id));
diesel::joinable!(sessions -> repositories (repository_id));
diesel::allow_tables_to_appear_in_same_query!(repositories, branches, sessions);
