//! The single profile row each user owns
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::chat::style::ChatStyle;
use crate::error::{AppError, Result};
use crate::store::schema::{enum_column, now_timestamp, timestamp_column, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub name: String,
    pub role: Role,
    pub age: Option<i64>,
    pub subject: Option<String>,
    pub chat_style: ChatStyle,
    pub qualification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileFields {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub role: Role,
    #[validate(range(min = 5, max = 100))]
    pub age: Option<i64>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub chat_style: ChatStyle,
    #[serde(default)]
    pub qualification: Option<String>,
}

pub struct ProfileStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl ProfileStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    pub fn get(&self, owner_id: &str) -> Result<Option<Profile>> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT * FROM profiles WHERE owner_id = ?1",
                [owner_id],
                Self::from_row,
            )
            .optional()?)
    }

    /// Create the profile on first save, overwrite it afterwards.
    /// The role chosen at creation is permanent.
    pub fn save(&self, owner_id: &str, fields: &ProfileFields) -> Result<Profile> {
        fields.validate()?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let existing_role: Option<String> = tx
            .query_row(
                "SELECT role FROM profiles WHERE owner_id = ?1",
                [owner_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(role) = existing_role {
            if role != fields.role.as_str() {
                return Err(AppError::Validation(format!(
                    "Role is fixed once the profile exists (currently {})",
                    role
                )));
            }
        }

        let now = now_timestamp();
        let profile = tx.query_row(
            "INSERT INTO profiles
             (owner_id, name, role, age, subject, chat_style, qualification, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT (owner_id) DO UPDATE SET
                name = excluded.name,
                age = excluded.age,
                subject = excluded.subject,
                chat_style = excluded.chat_style,
                qualification = excluded.qualification,
                updated_at = excluded.updated_at
             RETURNING *",
            params![
                owner_id,
                fields.name,
                fields.role.as_str(),
                fields.age,
                fields.subject,
                fields.chat_style.as_str(),
                fields.qualification,
                now,
            ],
            Self::from_row,
        )?;
        tx.commit()?;

        info!("Saved profile for {} ({})", owner_id, profile.role.as_str());
        Ok(profile)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
        let style: String = row.get("chat_style")?;
        Ok(Profile {
            name: row.get("name")?,
            role: enum_column(row, "role")?,
            age: row.get("age")?,
            subject: row.get("subject")?,
            chat_style: ChatStyle::parse(&style),
            qualification: row.get("qualification")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    fn fields(role: Role, age: Option<i64>) -> ProfileFields {
        ProfileFields {
            name: "Asha".into(),
            role,
            age,
            subject: Some("Maths".into()),
            chat_style: ChatStyle::Academic,
            qualification: None,
        }
    }

    #[test]
    fn test_first_save_creates_then_updates() {
        let db = Database::in_memory().unwrap();
        assert!(db.profiles.get("u1").unwrap().is_none());

        let created = db.profiles.save("u1", &fields(Role::Student, Some(14))).unwrap();
        assert_eq!(created.role, Role::Student);

        let mut changed = fields(Role::Student, Some(15));
        changed.chat_style = ChatStyle::Wise;
        let updated = db.profiles.save("u1", &changed).unwrap();
        assert_eq!(updated.age, Some(15));
        assert_eq!(updated.chat_style, ChatStyle::Wise);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_role_cannot_change() {
        let db = Database::in_memory().unwrap();
        db.profiles.save("u1", &fields(Role::Student, Some(14))).unwrap();

        let err = db.profiles.save("u1", &fields(Role::Teacher, Some(40))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(db.profiles.get("u1").unwrap().unwrap().role, Role::Student);
    }

    #[test]
    fn test_age_bounds() {
        let db = Database::in_memory().unwrap();
        for bad in [4, 101] {
            let err = db.profiles.save("u1", &fields(Role::Student, Some(bad))).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "age {} accepted", bad);
        }
        db.profiles.save("u1", &fields(Role::Student, Some(5))).unwrap();
        db.profiles.save("u2", &fields(Role::Teacher, Some(100))).unwrap();
        db.profiles.save("u3", &fields(Role::Teacher, None)).unwrap();
    }
}
