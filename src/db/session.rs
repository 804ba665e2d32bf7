//! Session records issued by the auth provider.
//!
//! The bridge only reads these through [`CredentialStore`]. Creation and
//! deletion exist for the provider side (and for local development via
//! `--issue-session`).

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::{CredentialStore, Session, StoreError};

/// Random bytes in a public token before encoding.
const TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    token: String,
    user_id: String,
    expires_at: i64,
    created_at: i64,
}

impl TryFrom<SessionRow> for Session {
    type Error = sqlx::Error;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            session_id: row.id,
            public_token: row.token,
            user_id: row.user_id,
            expires_at: from_millis(row.expires_at)?,
            created_at: from_millis(row.created_at)?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| sqlx::Error::Decode(format!("timestamp out of range: {}", ms).into()))
}

/// Random URL-safe token, independent of the session id.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a session for `user_id` valid for `ttl`.
    pub async fn create(&self, user_id: &str, ttl: Duration) -> Result<Session, sqlx::Error> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            sqlx::Error::Protocol(format!("session lifetime out of range: {}", ttl))
        })?;
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            public_token: generate_token(),
            user_id: user_id.to_string(),
            expires_at,
            created_at: now,
        };
        self.insert(&session).await?;
        Ok(session)
    }

    /// Store a session record as given.
    ///
    /// Fails if the id or the token is already taken.
    pub async fn insert(&self, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO sessions (id, token, user_id, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&session.session_id)
        .bind(&session.public_token)
        .bind(&session.user_id)
        .bind(session.expires_at.timestamp_millis())
        .bind(session.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_by_token(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, token, user_id, expires_at, created_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Session::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Session>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, token, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Session::try_from).transpose()
    }

    /// Delete a session (sign-out). Returns true if a row was removed.
    pub async fn delete(&self, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl CredentialStore for SessionStore {
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.get_by_token(token).await?)
    }

    async fn find_session_by_id(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }
}
