//! Database connection pool management.
//!
//! Initializes the SQLite connection pool with WAL mode enabled so concurrent
//! resolutions can read the cache while another writes, and creates the
//! database file on first use.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Pool, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

/// Initializes and returns a database connection pool for the given path.
///
/// Creates the database file if it doesn't exist and enables WAL mode for
/// better concurrent access. In-memory databases (`:memory:`) are accepted
/// for tests.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    let db_path_str = db_path.to_string_lossy();

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path_str))
        .map_err(|e| DatabaseError::FileCreationError(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePool::connect_with(options).await.map_err(|e| {
        error!("Failed to open database at {}: {e}", db_path_str);
        DatabaseError::SqlError(e)
    })?;

    info!("Database ready at {}", db_path_str);
    Ok(Arc::new(pool))
}
