//! Memoized per-repository session summaries.

use crate::mirror::domain::RepositoryId;
use crate::session::domain::SessionSummary;
use std::collections::HashMap;
use std::sync::RwLock;

/// Cache of [`SessionSummary`] values keyed by repository.
///
/// Every code path that mutates sessions of a repository, or deletes the
/// repository, calls [`SessionSummaryCache::invalidate`] for it.
#[derive(Debug, Default)]
pub struct SessionSummaryCache {
    entries: RwLock<HashMap<RepositoryId, SessionSummary>>,
}

impl SessionSummaryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached summary for a repository.
    ///
    /// A poisoned lock reads as a miss.
    #[must_use]
    pub fn get(&self, repository_id: RepositoryId) -> Option<SessionSummary> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&repository_id).cloned())
    }

    /// Stores a freshly computed summary.
    pub fn insert(&self, repository_id: RepositoryId, summary: SessionSummary) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(repository_id, summary);
        }
    }

    /// Drops the cached summary for a repository.
    ///
    /// A poisoned lock is recovered by dropping every entry.
    pub fn invalidate(&self, repository_id: RepositoryId) {
        match self.entries.write() {
            Ok(mut entries) => {
                entries.remove(&repository_id);
            }
            Err(poisoned) => {
                poisoned.into_inner().clear();
                self.entries.clear_poison();
            }
        }
    }

    /// Returns the number of cached summaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
