//! Helpers for provoking real SQLITE_BUSY contention on a file database.
//!
//! One connection takes the write lock with `BEGIN IMMEDIATE`; the pool under
//! test is opened with a zero busy timeout so its writes fail immediately
//! with a transient code instead of waiting inside SQLite. Rollback-journal
//! mode keeps `BEGIN EXCLUSIVE` blocking readers as well.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
};
use sqlx::Connection;

use sqlretry_core::pool::{PoolExecutor, RetryingPool};
use sqlretry_core::retry::{
    Backoff, CatalogClassifier, RetryObserver, RetryPolicy, RetryingExecutor,
    TransientErrorCatalog,
};

pub fn options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .busy_timeout(Duration::ZERO)
}

/// Executor retrying SQLite busy/locked codes every `every`, up to `max_attempts`.
pub fn executor(
    max_attempts: u32,
    every: Duration,
    observer: Arc<dyn RetryObserver>,
) -> PoolExecutor {
    let policy = RetryPolicy::new(CatalogClassifier::new(TransientErrorCatalog::sqlite()))
        .with_max_attempts(max_attempts)
        .with_backoff(Backoff::Fixed(every));
    RetryingExecutor::new(policy).with_observer(observer)
}

pub async fn open_pool(
    path: &Path,
    max_connections: u32,
    executor: PoolExecutor,
) -> RetryingPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options(path))
        .await
        .unwrap();
    RetryingPool::new(pool, executor)
}

/// Connection holding the database write lock until [`release`] is called.
pub async fn hold_write_lock(path: &Path) -> SqliteConnection {
    begin(path, "BEGIN IMMEDIATE").await
}

/// Like [`hold_write_lock`], but readers are locked out too.
pub async fn hold_exclusive_lock(path: &Path) -> SqliteConnection {
    begin(path, "BEGIN EXCLUSIVE").await
}

async fn begin(path: &Path, stmt: &'static str) -> SqliteConnection {
    let mut conn = SqliteConnection::connect_with(&options(path)).await.unwrap();
    sqlx::query(stmt).execute(&mut conn).await.unwrap();
    conn
}

pub async fn release(mut conn: SqliteConnection) {
    sqlx::query("COMMIT").execute(&mut conn).await.unwrap();
    conn.close().await.unwrap();
}
