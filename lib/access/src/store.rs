//! Session persistence interface and an in-memory implementation.

use crate::error::SessionStoreError;
use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use guild_gallery_core::{Result, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persists sessions between requests.
///
/// `load` never returns a session whose time-to-live has passed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Inserts or replaces a session, valid for `ttl` from now.
    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError>;

    /// Loads a live session.
    async fn load(&self, id: SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Removes a session (logout).
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError>;

    /// Removes all expired sessions, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, SessionStoreError>;
}

/// Process-local session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, (Session, DateTime<Utc>)>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError> {
        let expires_at = Utc::now() + ttl;
        self.sessions
            .write()
            .await
            .insert(session.id(), (session.clone(), expires_at));
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<Session>, SessionStoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&id)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(session, _)| session.clone()))
    }

    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
