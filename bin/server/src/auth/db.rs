//! PostgreSQL session repository.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use guild_gallery_access::{Session, SessionStore, SessionStoreError, SessionUser};
use guild_gallery_core::{Result, SessionId};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_data: Option<serde_json::Value>,
    established_at: DateTime<Utc>,
    site_authenticated: bool,
}

impl SessionRow {
    fn try_into_session(self) -> std::result::Result<Session, SessionStoreError> {
        let id = SessionId::from_str(&self.id).map_err(|e| SessionStoreError::Backend {
            details: format!("invalid session id '{}': {e}", self.id),
        })?;
        let user = self
            .user_data
            .map(serde_json::from_value::<SessionUser>)
            .transpose()
            .map_err(|e| SessionStoreError::Corrupt {
                session_id: id,
                details: format!("invalid user data: {e}"),
            })?;

        Ok(Session::restore(
            id,
            user,
            self.established_at,
            self.site_authenticated,
        ))
    }
}

fn backend(e: sqlx::Error) -> SessionStoreError {
    SessionStoreError::Backend {
        details: e.to_string(),
    }
}

/// Session store backed by the `sessions` table.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionStoreError> {
        let user_data = session
            .user()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| SessionStoreError::Corrupt {
                session_id: session.id(),
                details: format!("failed to encode user: {e}"),
            })?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_data, established_at, site_authenticated, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                user_data = EXCLUDED.user_data,
                established_at = EXCLUDED.established_at,
                site_authenticated = EXCLUDED.site_authenticated,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session.id().to_string())
        .bind(user_data)
        .bind(session.established_at())
        .bind(session.site_authenticated())
        .bind(Utc::now() + ttl)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<Option<Session>, SessionStoreError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_data, established_at, site_authenticated
            FROM sessions
            WHERE id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(r) => Ok(Some(r.try_into_session()?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, SessionStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected())
    }
}

/// Parses a session ID from a cookie value.
pub fn parse_session_id(value: &str) -> Option<SessionId> {
    SessionId::from_str(value).ok()
}
