//! `PostgreSQL` store implementation for mirrored repositories and branches.

use super::{
    models::{
        BranchChangeset, BranchRow, NewBranchRow, NewRepositoryRow, RepositoryChangeset,
        RepositoryRow,
    },
    schema::{branches, repositories},
};
use crate::mirror::{
    domain::{
        Branch, BranchId, BranchName, MirrorDomainError, OrganizationFilter, PersistedBranchData,
        RemoteRepositoryId, Repository, RepositoryFilter, RepositoryId, RepositorySnapshot,
        RepositorySort,
    },
    ports::{BranchStore, MirrorStoreError, MirrorStoreResult, RepositoryStore},
};
use async_trait::async_trait;
use camino::Utf8PathBuf;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by mirror adapters.
pub type MirrorPgPool = Pool<ConnectionManager<PgConnection>>;

type BoxedRepositoryQuery = repositories::BoxedQuery<'static, Pg>;

/// `PostgreSQL`-backed repository and branch store.
#[derive(Debug, Clone)]
pub struct PostgresMirrorStore {
    pool: MirrorPgPool,
}

impl PostgresMirrorStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MirrorPgPool) -> Self {
        Self { pool }
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &MirrorPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> MirrorStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MirrorStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MirrorStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(MirrorStoreError::persistence)?
    }
}

#[async_trait]
impl RepositoryStore for PostgresMirrorStore {
    async fn upsert_repository(&self, candidate: &Repository) -> MirrorStoreResult<Repository> {
        let new_row = to_new_repository_row(candidate)?;

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(repositories::table)
                .values(&new_row)
                .on_conflict(repositories::remote_id)
                .do_update()
                .set(&new_row.fields)
                .returning(RepositoryRow::as_returning())
                .get_result::<RepositoryRow>(connection)
                .map_err(MirrorStoreError::persistence)?;
            row_to_repository(row)
        })
        .await
    }

    async fn find_repository(&self, id: RepositoryId) -> MirrorStoreResult<Option<Repository>> {
        self.run_blocking(move |connection| {
            let row = repositories::table
                .filter(repositories::id.eq(id.into_inner()))
                .select(RepositoryRow::as_select())
                .first::<RepositoryRow>(connection)
                .optional()
                .map_err(MirrorStoreError::persistence)?;
            row.map(row_to_repository).transpose()
        })
        .await
    }

    async fn find_by_remote_id(
        &self,
        remote_id: RemoteRepositoryId,
    ) -> MirrorStoreResult<Option<Repository>> {
        let remote_value = to_remote_column(remote_id)?;
        self.run_blocking(move |connection| {
            let row = repositories::table
                .filter(repositories::remote_id.eq(remote_value))
                .select(RepositoryRow::as_select())
                .first::<RepositoryRow>(connection)
                .optional()
                .map_err(MirrorStoreError::persistence)?;
            row.map(row_to_repository).transpose()
        })
        .await
    }

    async fn find_by_full_name(&self, full_name: &str) -> MirrorStoreResult<Option<Repository>> {
        let full_name_value = full_name.to_owned();
        self.run_blocking(move |connection| {
            let row = repositories::table
                .filter(repositories::full_name.eq(&full_name_value))
                .select(RepositoryRow::as_select())
                .first::<RepositoryRow>(connection)
                .optional()
                .map_err(MirrorStoreError::persistence)?;
            row.map(row_to_repository).transpose()
        })
        .await
    }

    async fn list_repositories(&self, sort: RepositorySort) -> MirrorStoreResult<Vec<Repository>> {
        self.run_blocking(move |connection| {
            let rows = apply_sort(repositories::table.into_boxed(), sort)
                .select(RepositoryRow::as_select())
                .load::<RepositoryRow>(connection)
                .map_err(MirrorStoreError::persistence)?;
            rows.into_iter().map(row_to_repository).collect()
        })
        .await
    }

    async fn search(
        &self,
        filter: &RepositoryFilter,
        sort: RepositorySort,
    ) -> MirrorStoreResult<Vec<Repository>> {
        let criteria = filter.clone();
        self.run_blocking(move |connection| {
            let rows = apply_sort(apply_filter(&criteria), sort)
                .select(RepositoryRow::as_select())
                .load::<RepositoryRow>(connection)
                .map_err(MirrorStoreError::persistence)?;
            rows.into_iter().map(row_to_repository).collect()
        })
        .await
    }

    async fn delete_repository(&self, id: RepositoryId) -> MirrorStoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(repositories::table.filter(repositories::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(MirrorStoreError::persistence)?;
            if deleted == 0 {
                return Err(MirrorStoreError::RepositoryNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BranchStore for PostgresMirrorStore {
    async fn upsert_branch(&self, candidate: &Branch) -> MirrorStoreResult<Branch> {
        let repository_id = candidate.repository_id();
        let new_row = to_new_branch_row(candidate);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(branches::table)
                .values(&new_row)
                .on_conflict((branches::repository_id, branches::name))
                .do_update()
                .set(&new_row.fields)
                .returning(BranchRow::as_returning())
                .get_result::<BranchRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        MirrorStoreError::RepositoryNotFound(repository_id)
                    }
                    _ => MirrorStoreError::persistence(err),
                })?;
            row_to_branch(row)
        })
        .await
    }

    async fn list_branches(&self, repository_id: RepositoryId) -> MirrorStoreResult<Vec<Branch>> {
        self.run_blocking(move |connection| {
            let rows = branches::table
                .filter(branches::repository_id.eq(repository_id.into_inner()))
                .order((branches::is_default.desc(), branches::name.asc()))
                .select(BranchRow::as_select())
                .load::<BranchRow>(connection)
                .map_err(MirrorStoreError::persistence)?;
            rows.into_iter().map(row_to_branch).collect()
        })
        .await
    }

    async fn find_branch(
        &self,
        repository_id: RepositoryId,
        name: &BranchName,
    ) -> MirrorStoreResult<Option<Branch>> {
        let name_value = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = branches::table
                .filter(branches::repository_id.eq(repository_id.into_inner()))
                .filter(branches::name.eq(&name_value))
                .select(BranchRow::as_select())
                .first::<BranchRow>(connection)
                .optional()
                .map_err(MirrorStoreError::persistence)?;
            row.map(row_to_branch).transpose()
        })
        .await
    }

    async fn prune_branches(
        &self,
        repository_id: RepositoryId,
        keep: &[BranchName],
    ) -> MirrorStoreResult<usize> {
        let keep_names: Vec<String> = keep.iter().map(|name| name.as_str().to_owned()).collect();
        self.run_blocking(move |connection| {
            diesel::delete(
                branches::table
                    .filter(branches::repository_id.eq(repository_id.into_inner()))
                    .filter(branches::name.ne_all(keep_names)),
            )
            .execute(connection)
            .map_err(MirrorStoreError::persistence)
        })
        .await
    }
}

fn apply_filter(filter: &RepositoryFilter) -> BoxedRepositoryQuery {
    let mut query = repositories::table.into_boxed();

    if let Some(text) = filter.query() {
        let pattern = format!("%{}%", escape_like(text));
        query = query.filter(
            repositories::name
                .ilike(pattern.clone())
                .or(repositories::description.ilike(pattern.clone()))
                .or(repositories::organization.ilike(pattern)),
        );
    }
    if let Some(private) = filter.private() {
        query = query.filter(repositories::private.eq(private));
    }
    match filter.organization() {
        Some(OrganizationFilter::Personal) => {
            query = query.filter(repositories::organization.is_null());
        }
        Some(OrganizationFilter::Named(name)) => {
            query = query.filter(repositories::organization.ilike(escape_like(name)));
        }
        None => {}
    }
    if let Some(language) = filter.language() {
        query = query.filter(repositories::language.ilike(escape_like(language)));
    }
    query
}

fn apply_sort(query: BoxedRepositoryQuery, sort: RepositorySort) -> BoxedRepositoryQuery {
    let ordered = match sort {
        RepositorySort::UpdatedDesc => query.order(repositories::updated_at.desc()),
        RepositorySort::UpdatedAsc => query.order(repositories::updated_at.asc()),
        RepositorySort::NameAsc => query.order(repositories::name.asc()),
        RepositorySort::NameDesc => query.order(repositories::name.desc()),
        RepositorySort::LanguageAsc => query.order(repositories::language.asc().nulls_last()),
        RepositorySort::LanguageDesc => query.order(repositories::language.desc().nulls_first()),
    };
    ordered.then_order_by(repositories::full_name.asc())
}

fn escape_like(value: &str) -> String {
    value
        .chars()
        .fold(String::with_capacity(value.len()), |mut escaped, ch| {
            if matches!(ch, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(ch);
            escaped
        })
}

fn to_remote_column(remote_id: RemoteRepositoryId) -> MirrorStoreResult<i64> {
    i64::try_from(remote_id.value()).map_err(MirrorStoreError::persistence)
}

fn to_new_repository_row(repository: &Repository) -> MirrorStoreResult<NewRepositoryRow> {
    let snapshot = repository.snapshot();
    let size = i64::try_from(snapshot.size()).map_err(|_| {
        MirrorStoreError::persistence(MirrorDomainError::SizeOutOfRange(snapshot.size()))
    })?;

    Ok(NewRepositoryRow {
        id: repository.id().into_inner(),
        remote_id: to_remote_column(snapshot.remote_id())?,
        fields: RepositoryChangeset {
            name: snapshot.name().to_owned(),
            full_name: snapshot.full_name().to_owned(),
            description: snapshot.description().map(ToOwned::to_owned),
            url: snapshot.url().to_owned(),
            private: snapshot.is_private(),
            fork: snapshot.is_fork(),
            created_at: snapshot.created_at(),
            updated_at: snapshot.updated_at(),
            pushed_at: snapshot.pushed_at(),
            size,
            language: snapshot.language().map(ToOwned::to_owned),
            default_branch: snapshot.default_branch().to_owned(),
            organization: snapshot.organization().map(ToOwned::to_owned),
            last_synced: repository.last_synced(),
            local_path: snapshot.local_path().map(|path| path.as_str().to_owned()),
        },
    })
}

fn row_to_repository(row: RepositoryRow) -> MirrorStoreResult<Repository> {
    let RepositoryRow {
        id,
        remote_id,
        name,
        full_name,
        description,
        url,
        private,
        fork,
        created_at,
        updated_at,
        pushed_at,
        size,
        language,
        default_branch,
        organization,
        last_synced,
        local_path,
    } = row;

    let remote_value = u64::try_from(remote_id).map_err(MirrorStoreError::invalid_persisted_data)?;
    let parsed_remote_id =
        RemoteRepositoryId::new(remote_value).map_err(MirrorStoreError::invalid_persisted_data)?;
    let parsed_size = u64::try_from(size).map_err(MirrorStoreError::invalid_persisted_data)?;

    let mut snapshot = RepositorySnapshot::new(parsed_remote_id, name, url, created_at, updated_at)
        .with_full_name(full_name)
        .private(private)
        .fork(fork)
        .with_size(parsed_size)
        .with_default_branch(default_branch);
    if let Some(value) = description {
        snapshot = snapshot.with_description(value);
    }
    if let Some(value) = pushed_at {
        snapshot = snapshot.with_pushed_at(value);
    }
    if let Some(value) = language {
        snapshot = snapshot.with_language(value);
    }
    if let Some(value) = organization {
        snapshot = snapshot.with_organization(value);
    }
    if let Some(value) = local_path {
        snapshot = snapshot.with_local_path(Utf8PathBuf::from(value));
    }

    Ok(Repository::from_persisted(
        RepositoryId::from_uuid(id),
        snapshot,
        last_synced,
    ))
}

fn to_new_branch_row(branch: &Branch) -> NewBranchRow {
    NewBranchRow {
        id: branch.id().into_inner(),
        repository_id: branch.repository_id().into_inner(),
        name: branch.name().as_str().to_owned(),
        fields: BranchChangeset {
            is_default: branch.is_default(),
            last_commit_sha: branch.last_commit_sha().to_owned(),
            last_commit_message: branch.last_commit_message().map(ToOwned::to_owned),
            updated_at: branch.updated_at(),
        },
    }
}

fn row_to_branch(row: BranchRow) -> MirrorStoreResult<Branch> {
    let BranchRow {
        id,
        repository_id,
        name,
        is_default,
        last_commit_sha,
        last_commit_message,
        updated_at,
    } = row;

    let parsed_name = BranchName::new(name).map_err(MirrorStoreError::invalid_persisted_data)?;
    Ok(Branch::from_persisted(PersistedBranchData {
        id: BranchId::from_uuid(id),
        repository_id: RepositoryId::from_uuid(repository_id),
        name: parsed_name,
        is_default,
        last_commit_sha,
        last_commit_message,
        updated_at,
    }))
}
