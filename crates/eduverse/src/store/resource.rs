//! Generic owner-scoped table access.
//!
//! Every per-user table (tasks, notes, classes, students, ...) follows the same
//! contract: rows carry an `owner_id`, and every read and write is filtered by
//! it. An [`OwnedResource`] describes one table; [`ResourceStore`] runs the
//! list/get/create/update/delete/upsert queries for it. Mutations return the
//! row as stored (`RETURNING *`) so callers reconcile against the database
//! instead of their own optimistic copy.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection, OptionalExtension, Row};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::store::schema::now_timestamp;

/// Column values for a write, keyed by column name.
pub type Fields = Map<String, Value>;

/// Which write a [`OwnedResource::before_write`] hook is looking at.
/// Updates carry the row as currently stored so partial patches can be
/// checked against the columns they leave alone.
pub enum WriteKind<'a, R> {
    Create,
    Update(&'a R),
}

impl<R> WriteKind<'_, R> {
    pub fn stored(&self) -> Option<&R> {
        match self {
            WriteKind::Create => None,
            WriteKind::Update(row) => Some(row),
        }
    }
}

pub trait OwnedResource: Serialize + Sized + Send + Sync + 'static {
    /// Body accepted by `create`.
    type New: Serialize + DeserializeOwned + Send;

    /// Singular name used in error messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Writable columns, excluding `id`, `owner_id` and `created_at`.
    const COLUMNS: &'static [&'static str];
    /// Columns `list` may filter on.
    const FILTERS: &'static [&'static str] = &[];
    const ORDER_BY: &'static str = "created_at DESC, id DESC";
    /// Columns that reference another owned table, as `(column, table)`.
    /// The referenced row must belong to the same owner.
    const PARENTS: &'static [(&'static str, &'static str)] = &[];
    /// Parents that must agree with each other, as `(column, table, shared)`:
    /// the `table` row named by `column` must hold this row's `shared` value.
    const PARENT_LINKS: &'static [(&'static str, &'static str, &'static str)] = &[];
    /// Tables whose rows are deleted together with this one, as `(table, column)`.
    const CHILDREN: &'static [(&'static str, &'static str)] = &[];
    /// Composite key for `upsert`; empty when the resource is not upserted.
    const CONFLICT_KEY: &'static [&'static str] = &[];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Derive or check columns before they reach SQL.
    fn before_write(_kind: WriteKind<'_, Self>, _fields: &mut Fields) -> Result<()> {
        Ok(())
    }
}

pub struct ResourceStore<R> {
    pool: Arc<Pool<SqliteConnectionManager>>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            _marker: PhantomData,
        }
    }
}

impl<R: OwnedResource> ResourceStore<R> {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    fn get_conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// All rows of `owner`, optionally narrowed by equality filters.
    pub fn list(&self, owner_id: &str, filters: &[(String, String)]) -> Result<Vec<R>> {
        let mut sql = format!("SELECT * FROM {} WHERE owner_id = ?1", R::TABLE);
        let mut values = vec![SqlValue::Text(owner_id.to_string())];

        for (column, raw) in filters {
            if !R::FILTERS.contains(&column.as_str()) {
                return Err(AppError::Validation(format!(
                    "{} cannot be filtered by '{}'",
                    R::NAME,
                    column
                )));
            }
            values.push(filter_value(raw));
            sql.push_str(&format!(" AND {} = ?{}", column, values.len()));
        }
        sql.push_str(&format!(" ORDER BY {}", R::ORDER_BY));

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Listed {} {} rows for {}", rows.len(), R::TABLE, owner_id);
        Ok(rows)
    }

    pub fn get(&self, owner_id: &str, id: i64) -> Result<R> {
        let conn = self.get_conn()?;
        select_row::<R>(&conn, owner_id, id)?.ok_or_else(|| not_found::<R>(id))
    }

    pub fn create(&self, owner_id: &str, new: &R::New) -> Result<R> {
        let conn = self.get_conn()?;
        let created = insert_row::<R>(&conn, owner_id, new)?;
        info!("Created {} for {}", R::NAME, owner_id);
        Ok(created)
    }

    /// Insert several rows in one transaction; nothing is kept if one fails.
    pub fn create_many(&self, owner_id: &str, records: &[R::New]) -> Result<Vec<R>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let created = records
            .iter()
            .map(|new| insert_row::<R>(&tx, owner_id, new))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;

        info!("Created {} {} rows for {}", created.len(), R::TABLE, owner_id);
        Ok(created)
    }

    /// Overwrite the named columns of one row.
    pub fn update(&self, owner_id: &str, id: i64, mut patch: Fields) -> Result<R> {
        if patch.is_empty() {
            return Err(AppError::Validation(format!("No fields to update on {}", R::NAME)));
        }
        for column in patch.keys() {
            ensure_column::<R>(column)?;
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let stored = select_row::<R>(&tx, owner_id, id)?.ok_or_else(|| not_found::<R>(id))?;

        R::before_write(WriteKind::Update(&stored), &mut patch)?;
        check_parents::<R>(&tx, owner_id, &patch)?;
        let mut merged = to_fields(&stored)?;
        merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
        check_links::<R>(&tx, owner_id, &merged)?;

        let mut assignments = Vec::with_capacity(patch.len());
        let mut values = Vec::with_capacity(patch.len() + 2);
        for (column, value) in &patch {
            ensure_column::<R>(column)?;
            values.push(sql_value(column, value)?);
            assignments.push(format!("{} = ?{}", column, values.len()));
        }
        values.push(SqlValue::Integer(id));
        values.push(SqlValue::Text(owner_id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{} AND owner_id = ?{} RETURNING *",
            R::TABLE,
            assignments.join(", "),
            values.len() - 1,
            values.len()
        );

        let updated = tx
            .query_row(&sql, params_from_iter(values), |row| R::from_row(row))
            .optional()?
            .ok_or_else(|| not_found::<R>(id))?;
        tx.commit()?;

        debug!("Updated {} {} for {}", R::NAME, id, owner_id);
        Ok(updated)
    }

    /// Physically delete one row and any declared children.
    pub fn delete(&self, owner_id: &str, id: i64) -> Result<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1 AND owner_id = ?2", R::TABLE),
            rusqlite::params![id, owner_id],
        )?;
        if deleted == 0 {
            return Err(not_found::<R>(id));
        }

        for (table, column) in R::CHILDREN {
            let removed = tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1 AND owner_id = ?2", table, column),
                rusqlite::params![id, owner_id],
            )?;
            debug!("Cascade removed {} rows from {}", removed, table);
        }
        tx.commit()?;

        info!("Deleted {} {} for {}", R::NAME, id, owner_id);
        Ok(())
    }

    /// Insert or overwrite rows on the resource's composite key; last write wins.
    pub fn upsert(&self, owner_id: &str, records: &[R::New]) -> Result<Vec<R>> {
        if R::CONFLICT_KEY.is_empty() {
            return Err(AppError::Validation(format!("{} does not support upsert", R::NAME)));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut stored = Vec::with_capacity(records.len());

        for new in records {
            let mut fields = to_fields(new)?;
            R::before_write(WriteKind::Create, &mut fields)?;
            check_parents::<R>(&tx, owner_id, &fields)?;
            check_links::<R>(&tx, owner_id, &fields)?;
            let (columns, values) = insert_parts::<R>(owner_id, &fields)?;

            let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
            let updates: Vec<String> = fields
                .keys()
                .filter(|c| !R::CONFLICT_KEY.contains(&c.as_str()))
                .map(|c| format!("{} = excluded.{}", c, c))
                .collect();
            let conflict = std::iter::once("owner_id")
                .chain(R::CONFLICT_KEY.iter().copied())
                .collect::<Vec<_>>()
                .join(", ");
            let action = if updates.is_empty() {
                // Keep RETURNING working when every column is part of the key.
                "owner_id = excluded.owner_id".to_string()
            } else {
                updates.join(", ")
            };

            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
                R::TABLE,
                columns.join(", "),
                placeholders.join(", "),
                conflict,
                action
            );
            let row = tx.query_row(&sql, params_from_iter(values), |row| R::from_row(row))?;
            stored.push(row);
        }
        tx.commit()?;

        info!("Upserted {} {} rows for {}", stored.len(), R::TABLE, owner_id);
        Ok(stored)
    }
}

fn insert_row<R: OwnedResource>(conn: &Connection, owner_id: &str, new: &R::New) -> Result<R> {
    let mut fields = to_fields(new)?;
    R::before_write(WriteKind::Create, &mut fields)?;
    check_parents::<R>(conn, owner_id, &fields)?;
    check_links::<R>(conn, owner_id, &fields)?;

    let (columns, values) = insert_parts::<R>(owner_id, &fields)?;
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        R::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    );

    Ok(conn.query_row(&sql, params_from_iter(values), |row| R::from_row(row))?)
}

fn insert_parts<R: OwnedResource>(owner_id: &str, fields: &Fields) -> Result<(Vec<String>, Vec<SqlValue>)> {
    let mut columns = vec!["owner_id".to_string(), "created_at".to_string()];
    let mut values = vec![SqlValue::Text(owner_id.to_string()), SqlValue::Text(now_timestamp())];

    for (column, value) in fields {
        ensure_column::<R>(column)?;
        // Absent optionals fall back to the column default.
        if value.is_null() {
            continue;
        }
        columns.push(column.clone());
        values.push(sql_value(column, value)?);
    }

    Ok((columns, values))
}

fn to_fields<T: Serialize>(new: &T) -> Result<Fields> {
    match serde_json::to_value(new)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Validation(format!("Expected an object, got {}", other))),
    }
}

fn ensure_column<R: OwnedResource>(column: &str) -> Result<()> {
    if R::COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Unknown column '{}' for {}",
            column,
            R::NAME
        )))
    }
}

fn check_parents<R: OwnedResource>(conn: &Connection, owner_id: &str, fields: &Fields) -> Result<()> {
    for (column, table) in R::PARENTS {
        let Some(value) = fields.get(*column) else {
            continue;
        };
        let Some(parent_id) = value.as_i64() else {
            return Err(AppError::Validation(format!("{} must be an integer id", column)));
        };

        let exists = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1 AND owner_id = ?2", table),
                rusqlite::params![parent_id, owner_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(AppError::NotFound(format!("{} {} ({})", table, parent_id, column)));
        }
    }
    Ok(())
}

fn check_links<R: OwnedResource>(conn: &Connection, owner_id: &str, fields: &Fields) -> Result<()> {
    for (column, table, shared) in R::PARENT_LINKS {
        let (Some(parent_id), Some(expected)) = (
            fields.get(*column).and_then(Value::as_i64),
            fields.get(*shared).and_then(Value::as_i64),
        ) else {
            continue;
        };

        let actual: Option<i64> = conn
            .query_row(
                &format!("SELECT {} FROM {} WHERE id = ?1 AND owner_id = ?2", shared, table),
                rusqlite::params![parent_id, owner_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(actual) = actual.filter(|actual| *actual != expected) {
            return Err(AppError::Validation(format!(
                "{} {} belongs to {} {}, not {}",
                table, parent_id, shared, actual, expected
            )));
        }
    }
    Ok(())
}

fn select_row<R: OwnedResource>(conn: &Connection, owner_id: &str, id: i64) -> Result<Option<R>> {
    Ok(conn
        .query_row(
            &format!("SELECT * FROM {} WHERE id = ?1 AND owner_id = ?2", R::TABLE),
            rusqlite::params![id, owner_id],
            |row| R::from_row(row),
        )
        .optional()?)
}

fn sql_value(column: &str, value: &Value) -> Result<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(AppError::Validation(format!("{} is out of range", column)))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(AppError::Validation(format!(
            "{} must be a plain value",
            column
        ))),
    }
}

/// Query-string values arrive as text; ids and flags compare as integers.
fn filter_value(raw: &str) -> SqlValue {
    match raw {
        "true" => return SqlValue::Integer(1),
        "false" => return SqlValue::Integer(0),
        _ => {}
    }
    match raw.parse::<i64>() {
        Ok(i) if !raw.starts_with('0') || raw == "0" => SqlValue::Integer(i),
        _ => SqlValue::Text(raw.to_string()),
    }
}

fn not_found<R: OwnedResource>(id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", R::NAME, id))
}
