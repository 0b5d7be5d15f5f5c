use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub mod migrations;
pub mod schema;

use crate::error::AppError;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Opens (creating if necessary) the database at `path`, enables WAL mode and
/// foreign keys on every pooled connection, runs the schema/migration step, and
/// returns a bounded connection pool.
///
/// Foreign keys must be enabled per-connection at connect time; this is
/// done via the manager's `with_init` hook so every checkout — including ones
/// r2d2 opens lazily under load — gets the pragma.
pub fn open_pool(path: &str, max_size: u32) -> anyhow::Result<DbPool> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;",
        )
    });

    let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;

    {
        let mut conn = pool.get()?;
        migrations::run(&mut conn)?;
    }

    Ok(pool)
}

/// Opens an in-memory, shared-cache database for tests. Each call returns an
/// independent, fully migrated database.
pub fn open_test_pool() -> anyhow::Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:vitrari-test-{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(&uri)
        .with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    // A shared-cache in-memory database is dropped once every connection to it
    // closes, so the pool must hold at least one connection open for the
    // lifetime of the test.
    let pool = r2d2::Pool::builder().max_size(4).min_idle(Some(1)).build(manager)?;

    {
        let mut conn = pool.get()?;
        migrations::run(&mut conn)?;
    }

    Ok(pool)
}

/// Runs a blocking closure against a pooled connection on a blocking thread,
/// bridging the synchronous `rusqlite` driver into the async façade. This is
/// the suspension point referred to in the concurrency model: each call is one
/// transaction or statement and never interleaves with another call's I/O.
pub async fn with_conn<F, T>(pool: &DbPool, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get().map_err(AppError::from)?;
        f(&conn)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("blocking task panicked: {e}")))?
}
