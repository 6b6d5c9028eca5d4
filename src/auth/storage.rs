//! Postgres-backed user directory and session records.
//!
//! Schema lives in `sql/schema.sql`; apply it before pointing `--dsn` at a
//! database. Queries run inside `db.query` spans so they show up in traces.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::backing::SessionBacking;
use super::directory::{InsertOutcome, User, UserDirectory};
use super::store::Session;

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>> {
        let query = "SELECT id, email, secret_hash FROM users WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(identifier)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup users by email")?;

        Ok(rows
            .into_iter()
            .map(|row| User {
                id: row.get("id"),
                email: row.get("email"),
                secret_hash: row.get("secret_hash"),
            })
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = "SELECT id, email, secret_hash FROM users WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            secret_hash: row.get("secret_hash"),
        }))
    }

    async fn insert(&self, email: &str, secret_hash: &str) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO users (email, secret_hash)
            VALUES ($1, $2)
            RETURNING id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .bind(secret_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(InsertOutcome::Created(User {
                id: row.get("id"),
                email: email.to_string(),
                secret_hash: secret_hash.to_string(),
            })),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }
}

pub struct PgSessionBacking {
    pool: PgPool,
}

impl PgSessionBacking {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionBacking for PgSessionBacking {
    async fn put(&self, session: &Session) -> Result<()> {
        let query = r"
            INSERT INTO user_sessions (session_id, user_id, created_at_unix)
            VALUES ($1, $2, $3)
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&session.session_id)
            .bind(session.user_id)
            .bind(session.created_at_unix)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert session record")?;
        Ok(())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Session>> {
        let query = r"
            SELECT session_id, user_id, created_at_unix
            FROM user_sessions
            WHERE session_id = $1
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session record")?;

        Ok(row.map(|row| Session {
            session_id: row.get("session_id"),
            user_id: row.get("user_id"),
            created_at_unix: row.get("created_at_unix"),
        }))
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        let query = "DELETE FROM user_sessions WHERE session_id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(session_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session record")?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_all(&self) -> Result<Vec<Session>> {
        let query = "SELECT session_id, user_id, created_at_unix FROM user_sessions";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to load session records")?;

        Ok(rows
            .into_iter()
            .map(|row| Session {
                session_id: row.get("session_id"),
                user_id: row.get("user_id"),
                created_at_unix: row.get("created_at_unix"),
            })
            .collect())
    }
}
