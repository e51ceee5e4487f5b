//! Connection pool creation and configuration.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Path that opens a private in-memory database per connection.
pub const MEMORY_PATH: &str = ":memory:";

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long SQLite retries a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections. Forced to 1 for `:memory:`.
    pub pool_max_size: u32,

    /// How long a caller waits for a free pooled connection, in milliseconds.
    pub acquire_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
            acquire_timeout_ms: 30_000,
        }
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Per-connection setup: WAL journal, foreign keys, busy timeout.
fn init_connection(conn: &mut Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    // In-memory databases report "memory".
    if journal_mode != "wal" && journal_mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("failed to set WAL journal mode, got: {journal_mode}")),
        ));
    }
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
}

/// Creates the session store pool.
///
/// Every pooled connection to `:memory:` would be a separate empty database,
/// so in-memory pools always hold exactly one connection.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the pool cannot be built.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let busy_timeout_ms = settings.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| init_connection(conn, busy_timeout_ms));

    let max_size = if db_path == MEMORY_PATH {
        1
    } else {
        settings.pool_max_size.max(1)
    };
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_millis(settings.acquire_timeout_ms.max(1)))
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        max_size,
        acquire_timeout_ms = settings.acquire_timeout_ms,
        "session store pool ready"
    );
    Ok(pool)
}
