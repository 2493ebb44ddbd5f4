//! `PostgreSQL` session store on the shared mirror pool.

use super::models::{SessionChangeset, SessionRow};
use crate::mirror::{
    adapters::postgres::{
        PostgresMirrorStore,
        schema::{repositories, sessions},
    },
    domain::{BranchId, RepositoryId},
};
use crate::session::{
    domain::{PersistedSessionData, Session, SessionId, WorkspaceState},
    ports::{SessionStart, SessionStore, SessionStoreError, SessionStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

impl From<DieselError> for SessionStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

async fn run_blocking<F, T>(store: &PostgresMirrorStore, f: F) -> SessionStoreResult<T>
where
    F: FnOnce(&mut PgConnection) -> SessionStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = store.pool().clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(SessionStoreError::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(SessionStoreError::persistence)?
}

#[async_trait]
impl SessionStore for PostgresMirrorStore {
    async fn start_session(&self, session: &Session) -> SessionStoreResult<SessionStart> {
        let row = to_row(session)?;
        let repository_id = session.repository_id();
        let started_at = session.started_at();

        run_blocking(self, move |connection| {
            connection.transaction::<_, SessionStoreError, _>(|tx| {
                // Concurrent starts on one repository queue on this row lock.
                let locked = repositories::table
                    .filter(repositories::id.eq(repository_id.into_inner()))
                    .select(repositories::id)
                    .for_update()
                    .first::<uuid::Uuid>(tx)
                    .optional()?;
                if locked.is_none() {
                    return Err(SessionStoreError::RepositoryNotFound(repository_id));
                }

                let superseded = diesel::update(
                    sessions::table
                        .filter(sessions::repository_id.eq(repository_id.into_inner()))
                        .filter(sessions::active.eq(true)),
                )
                .set((
                    sessions::active.eq(false),
                    sessions::ended_at.eq(Some(started_at)),
                ))
                .execute(tx)?;

                let inserted = diesel::insert_into(sessions::table)
                    .values(&row)
                    .returning(SessionRow::as_returning())
                    .get_result::<SessionRow>(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            SessionStoreError::RepositoryNotFound(repository_id)
                        }
                        _ => SessionStoreError::persistence(err),
                    })?;

                Ok(SessionStart {
                    session: row_to_session(inserted)?,
                    superseded,
                })
            })
        })
        .await
    }

    async fn update_session(&self, session: &Session) -> SessionStoreResult<()> {
        let session_id = session.id();
        let changeset = SessionChangeset {
            branch_id: session.branch_id().map(BranchId::into_inner),
            ended_at: session.ended_at(),
            active: session.is_active(),
            notes: session.notes().to_owned(),
            workspace: serde_json::to_value(session.workspace())
                .map_err(SessionStoreError::persistence)?,
        };

        run_blocking(self, move |connection| {
            let updated = diesel::update(
                sessions::table.filter(sessions::id.eq(session_id.into_inner())),
            )
            .set(&changeset)
            .execute(connection)?;
            if updated == 0 {
                return Err(SessionStoreError::NotFound(session_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>> {
        run_blocking(self, move |connection| {
            let row = sessions::table
                .filter(sessions::id.eq(id.into_inner()))
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()?;
            row.map(row_to_session).transpose()
        })
        .await
    }

    async fn active_session(
        &self,
        repository_id: RepositoryId,
    ) -> SessionStoreResult<Option<Session>> {
        run_blocking(self, move |connection| {
            let row = sessions::table
                .filter(sessions::repository_id.eq(repository_id.into_inner()))
                .filter(sessions::active.eq(true))
                .select(SessionRow::as_select())
                .first::<SessionRow>(connection)
                .optional()?;
            row.map(row_to_session).transpose()
        })
        .await
    }

    async fn list_sessions(&self, repository_id: RepositoryId) -> SessionStoreResult<Vec<Session>> {
        run_blocking(self, move |connection| {
            let rows = sessions::table
                .filter(sessions::repository_id.eq(repository_id.into_inner()))
                .order((sessions::started_at.desc(), sessions::id.asc()))
                .select(SessionRow::as_select())
                .load::<SessionRow>(connection)?;
            rows.into_iter().map(row_to_session).collect()
        })
        .await
    }
}

fn to_row(session: &Session) -> SessionStoreResult<SessionRow> {
    Ok(SessionRow {
        id: session.id().into_inner(),
        repository_id: session.repository_id().into_inner(),
        branch_id: session.branch_id().map(BranchId::into_inner),
        started_at: session.started_at(),
        ended_at: session.ended_at(),
        active: session.is_active(),
        notes: session.notes().to_owned(),
        workspace: serde_json::to_value(session.workspace())
            .map_err(SessionStoreError::persistence)?,
    })
}

fn row_to_session(row: SessionRow) -> SessionStoreResult<Session> {
    let SessionRow {
        id,
        repository_id,
        branch_id,
        started_at,
        ended_at,
        active,
        notes,
        workspace,
    } = row;

    let parsed_workspace: WorkspaceState =
        serde_json::from_value(workspace).map_err(SessionStoreError::invalid_persisted_data)?;
    Ok(Session::from_persisted(PersistedSessionData {
        id: SessionId::from_uuid(id),
        repository_id: RepositoryId::from_uuid(repository_id),
        branch_id: branch_id.map(BranchId::from_uuid),
        started_at,
        ended_at,
        active,
        notes,
        workspace: parsed_workspace,
    }))
}
