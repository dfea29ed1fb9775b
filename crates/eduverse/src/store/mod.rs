//! Store module - SQLite-backed storage for accounts, profiles and every owner-scoped table
pub mod schema;
pub mod migration;
pub mod resource;
pub mod personal;
pub mod classroom;
pub mod profile_store;
pub mod user_store;

pub use schema::*;
pub use migration::MigrationManager;
pub use resource::{Fields, OwnedResource, ResourceStore, WriteKind};
pub use personal::*;
pub use classroom::*;
pub use profile_store::{Profile, ProfileFields, ProfileStore};
pub use user_store::{SessionRow, UserRow, UserStore};

use std::path::Path;
use std::sync::Arc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

/// Connection pool plus the stores that share it
pub struct Database {
    pub users: UserStore,
    pub profiles: ProfileStore,
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    pub fn open(db_path: &Path, pool_size: u32) -> anyhow::Result<Self> {
        info!("Opening EduVerse database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )
            });
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create connection pool: {}", e))?;

        {
            let mut conn = pool.get()?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;",
            )?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }

        info!("Database initialized successfully");
        Ok(Self::with_pool(Arc::new(pool)))
    }

    /// Private in-memory database. The pool holds a single connection
    /// because every SQLite memory connection is its own database.
    pub fn in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        {
            let mut conn = pool.get()?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }
        Ok(Self::with_pool(Arc::new(pool)))
    }

    fn with_pool(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self {
            users: UserStore::new(Arc::clone(&pool)),
            profiles: ProfileStore::new(Arc::clone(&pool)),
            pool,
        }
    }

    /// Owner-scoped access to one resource table
    pub fn resource<R: OwnedResource>(&self) -> ResourceStore<R> {
        ResourceStore::new(Arc::clone(&self.pool))
    }

    pub fn stats(&self) -> anyhow::Result<DatabaseStats> {
        let conn = self.pool.get()?;
        Ok(migration::get_database_stats(&conn)?)
    }
}
