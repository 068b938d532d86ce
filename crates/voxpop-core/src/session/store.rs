//! Keyed registry of live project sessions.

use super::model::ProjectSession;
use crate::error::{Result, VoxError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-wide registry mapping opaque session ids to their state.
///
/// Each session sits behind its own lock, so commands against different
/// sessions run independently while commands against one session
/// serialize.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<RwLock<ProjectSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new session with a generated id and returns both.
    pub async fn create(&self) -> (String, Arc<RwLock<ProjectSession>>) {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(RwLock::new(ProjectSession::new(id.clone())));
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        tracing::debug!(target: "session", session = %id, "session created");
        (id, session)
    }

    /// Looks up an existing session by id.
    pub async fn get(&self, id: &str) -> Result<Arc<RwLock<ProjectSession>>> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| VoxError::not_found("session", id))
    }

    /// Drops a session from the registry.
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| VoxError::not_found("session", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_sessions_are_retrievable_by_id() {
        let store = SessionStore::new();
        let (id, _) = store.create().await;

        let session = store.get(&id).await.unwrap();
        assert_eq!(session.read().await.id(), id);
    }

    #[tokio::test]
    async fn unknown_session_id_is_not_found() {
        let store = SessionStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let store = SessionStore::new();
        let (id, _) = store.create().await;
        store.remove(&id).await.unwrap();
        assert!(store.get(&id).await.is_err());
    }
}
