//! Accounts and access tokens backing the local identity gateway
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::store::migration::MigrationManager;
use crate::store::schema::{format_timestamp, now_timestamp, timestamp_column};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionRow {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct UserStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl UserStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    pub fn insert_user(&self, id: &str, email: &str, password_hash: &str, salt: &str) -> Result<UserRow> {
        let conn = self.pool.get()?;
        conn.query_row(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
            params![id, email, password_hash, salt, now_timestamp()],
            user_from_row,
        )
        .map_err(|e| match AppError::from(e) {
            AppError::Validation(_) => AppError::Validation(format!("An account already exists for {}", email)),
            other => other,
        })
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row("SELECT * FROM users WHERE email = ?1", [email], user_from_row)
            .optional()?)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row("SELECT * FROM users WHERE id = ?1", [id], user_from_row)
            .optional()?)
    }

    pub fn insert_session(&self, token: &str, user_id: &str, expires_at: DateTime<Utc>) -> Result<SessionRow> {
        let conn = self.pool.get()?;
        Ok(conn.query_row(
            "INSERT INTO auth_sessions (token, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4) RETURNING *",
            params![token, user_id, now_timestamp(), format_timestamp(expires_at)],
            session_from_row,
        )?)
    }

    /// The session behind `token`, if it has not expired.
    pub fn find_live_session(&self, token: &str) -> Result<Option<SessionRow>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT * FROM auth_sessions WHERE token = ?1 AND expires_at > ?2",
                params![token, now_timestamp()],
                session_from_row,
            )
            .optional()?)
    }

    pub fn delete_session(&self, token: &str) -> Result<usize> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        debug!("Removed {} session(s)", deleted);
        Ok(deleted)
    }

    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let mut conn = self.pool.get()?;
        Ok(MigrationManager::new(&mut conn).purge_expired_sessions(&now_timestamp())?)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        salt: row.get("salt")?,
        created_at: timestamp_column(row, "created_at")?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        token: row.get("token")?,
        user_id: row.get("user_id")?,
        created_at: timestamp_column(row, "created_at")?,
        expires_at: timestamp_column(row, "expires_at")?,
    })
}
