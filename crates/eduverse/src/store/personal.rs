//! Rows owned directly by a user: todo tasks, notes, saved passwords and chat threads
use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::store::resource::{Fields, OwnedResource, WriteKind};
use crate::store::schema::{enum_column, timestamp_column, Priority};
use crate::tools::password;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl OwnedResource for Task {
    type New = NewTask;

    const NAME: &'static str = "task";
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &["title", "priority", "due_date", "completed"];
    const FILTERS: &'static [&'static str] = &["completed", "priority"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            priority: enum_column(row, "priority")?,
            due_date: row.get("due_date")?,
            completed: row.get("completed")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    /// Completing a task moves it to the `Completed` priority; reopening it
    /// lands on `Medium`. The priority it had before completion is not kept.
    /// `Completed` is never a priority of an open task, and a completed task
    /// keeps it until reopened.
    fn before_write(kind: WriteKind<'_, Self>, fields: &mut Fields) -> Result<()> {
        let completing = fields.get("completed").and_then(Value::as_bool);
        let was_completed = kind.stored().is_some_and(|task| task.completed);
        let requested = fields.get("priority").and_then(Value::as_str);
        let completed_label = Priority::Completed.as_str();

        if completing.unwrap_or(was_completed) {
            if completing.is_none() && requested.is_some_and(|p| p != completed_label) {
                return Err(AppError::Validation(
                    "A completed task keeps the Completed priority; reopen it first".into(),
                ));
            }
            fields.insert("priority".into(), Value::from(completed_label));
        } else {
            if requested == Some(completed_label) {
                return Err(AppError::Validation(
                    "Priority Completed is set by completing the task".into(),
                ));
            }
            if was_completed && requested.is_none() {
                fields.insert("priority".into(), Value::from(Priority::Medium.as_str()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNote {
    pub content: String,
}

impl OwnedResource for Note {
    type New = NewNote;

    const NAME: &'static str = "note";
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &["content"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            content: row.get("content")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

/// A generated password the user chose to keep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordRecord {
    pub id: i64,
    pub title: String,
    pub generated_password: String,
    pub strength: String,
    pub length: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasswordRecord {
    pub title: String,
    pub generated_password: String,
}

impl OwnedResource for PasswordRecord {
    type New = NewPasswordRecord;

    const NAME: &'static str = "password";
    const TABLE: &'static str = "passwords";
    const COLUMNS: &'static [&'static str] = &["title", "generated_password", "strength", "length"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            generated_password: row.get("generated_password")?,
            strength: row.get("strength")?,
            length: row.get("length")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }

    /// Strength and length are fixed at save time.
    fn before_write(kind: WriteKind<'_, Self>, fields: &mut Fields) -> Result<()> {
        if !matches!(kind, WriteKind::Create) {
            return Ok(());
        }
        let Some(secret) = fields.get("generated_password").and_then(Value::as_str) else {
            return Err(AppError::Validation("generated_password is required".into()));
        };
        let label = password::StrengthLabel::of(secret);
        let length = secret.chars().count() as i64;

        fields.insert("strength".into(), Value::from(label.as_str()));
        fields.insert("length".into(), Value::from(length));
        Ok(())
    }
}

/// Chat thread header. Messages themselves stay with the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    pub mode: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversation {
    pub title: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    "chat".to_string()
}

impl OwnedResource for Conversation {
    type New = NewConversation;

    const NAME: &'static str = "conversation";
    const TABLE: &'static str = "conversations";
    const COLUMNS: &'static [&'static str] = &["title", "mode"];
    const FILTERS: &'static [&'static str] = &["mode"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            mode: row.get("mode")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}
