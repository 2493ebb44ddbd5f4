//! In-memory session store sharing state with the mirror store.

use crate::mirror::{adapters::memory::InMemoryMirrorStore, domain::RepositoryId};
use crate::session::{
    domain::{Session, SessionId},
    ports::{SessionStart, SessionStore, SessionStoreError, SessionStoreResult},
};
use async_trait::async_trait;

#[async_trait]
impl SessionStore for InMemoryMirrorStore {
    async fn start_session(&self, session: &Session) -> SessionStoreResult<SessionStart> {
        let mut state = self
            .write_state()
            .map_err(SessionStoreError::persistence)?;
        if !state.repositories.contains_key(&session.repository_id()) {
            return Err(SessionStoreError::RepositoryNotFound(
                session.repository_id(),
            ));
        }

        let mut superseded = 0;
        for existing in state.sessions.values_mut() {
            if existing.repository_id() == session.repository_id() && existing.is_active() {
                existing.supersede(session.started_at());
                superseded += 1;
            }
        }
        state.sessions.insert(session.id(), session.clone());

        Ok(SessionStart {
            session: session.clone(),
            superseded,
        })
    }

    async fn update_session(&self, session: &Session) -> SessionStoreResult<()> {
        let mut state = self
            .write_state()
            .map_err(SessionStoreError::persistence)?;
        let stored = state
            .sessions
            .get_mut(&session.id())
            .ok_or(SessionStoreError::NotFound(session.id()))?;
        *stored = session.clone();
        Ok(())
    }

    async fn find_session(&self, id: SessionId) -> SessionStoreResult<Option<Session>> {
        let state = self.read_state().map_err(SessionStoreError::persistence)?;
        Ok(state.sessions.get(&id).cloned())
    }

    async fn active_session(
        &self,
        repository_id: RepositoryId,
    ) -> SessionStoreResult<Option<Session>> {
        let state = self.read_state().map_err(SessionStoreError::persistence)?;
        Ok(state
            .sessions
            .values()
            .find(|session| session.repository_id() == repository_id && session.is_active())
            .cloned())
    }

    async fn list_sessions(&self, repository_id: RepositoryId) -> SessionStoreResult<Vec<Session>> {
        let state = self.read_state().map_err(SessionStoreError::persistence)?;
        let mut sessions: Vec<Session> = state
            .sessions
            .values()
            .filter(|session| session.repository_id() == repository_id)
            .cloned()
            .collect();
        sessions.sort_by(|left, right| {
            right
                .started_at()
                .cmp(&left.started_at())
                .then_with(|| left.id().cmp(&right.id()))
        });
        Ok(sessions)
    }
}
