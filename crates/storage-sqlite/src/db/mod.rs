use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use diesel::connection::{Connection, SimpleConnection};
use diesel::r2d2;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::errors::StorageError;
use stockdice_core::errors::{DatabaseError, Error, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub mod write_actor;
pub use write_actor::{spawn_writer, WriteHandle};

/// Create the database directory and file, and switch the file to WAL mode.
///
/// Returns the database path as a string for [`create_pool`].
pub fn init(db_path: &Path) -> Result<String> {
    if let Some(db_dir) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !db_dir.exists() {
            fs::create_dir_all(db_dir)?;
        }
    }

    let db_path = db_path.to_string_lossy().to_string();
    {
        let mut conn = SqliteConnection::establish(&db_path).map_err(StorageError::from)?;
        conn.batch_execute(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous  = NORMAL;
        ",
        )
        .map_err(StorageError::from)?;
    }

    Ok(db_path)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = r2d2::Pool::builder()
        .max_size(8)
        .min_idle(Some(1)) // Keep at least one connection ready
        .connection_timeout(std::time::Duration::from_secs(30))
        .connection_customizer(Box::new(ConnectionCustomizer {}))
        .build(manager)
        .map_err(|e| DatabaseError::PoolCreationFailed(e.to_string()))?;
    Ok(Arc::new(pool))
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Running database migrations");
    let mut connection = get_connection(pool)?;

    let result = connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        error!("Database migration failed: {}", e);
        Error::Database(DatabaseError::MigrationFailed(e.to_string()))
    })?;

    if result.is_empty() {
        info!("No pending migrations to apply.");
    } else {
        info!("Applied the following migrations:");
        for migration_version in &result {
            info!("  - {}", migration_version);
        }
    }

    Ok(())
}

pub fn get_connection(pool: &Pool<ConnectionManager<SqliteConnection>>) -> Result<DbConnection> {
    Ok(pool.get().map_err(StorageError::from)?)
}

/// Write a consistent, compacted copy of the database to `replica_path`
/// with `VACUUM INTO`. A stale replica is removed first.
///
/// Only a read transaction is held, so writers are not blocked.
pub fn backup_database(pool: &DbPool, replica_path: &Path) -> Result<PathBuf> {
    let backup_failed = |e: String| {
        error!("Failed to back up database to {}: {}", replica_path.display(), e);
        Error::Database(DatabaseError::BackupFailed(e))
    };

    if let Some(dir) = replica_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| backup_failed(e.to_string()))?;
    }
    if replica_path.exists() {
        fs::remove_file(replica_path).map_err(|e| backup_failed(e.to_string()))?;
    }

    let target = replica_path.to_string_lossy().replace('\'', "''");
    let mut conn = get_connection(pool)?;
    conn.batch_execute(&format!("VACUUM INTO '{}'", target))
        .map_err(|e| backup_failed(e.to_string()))?;

    info!("Database backed up to {}", replica_path.display());
    Ok(replica_path.to_path_buf())
}

#[derive(Debug)]
struct ConnectionCustomizer;

impl r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .map_err(diesel::r2d2::Error::QueryError)?;
        Ok(())
    }
}
