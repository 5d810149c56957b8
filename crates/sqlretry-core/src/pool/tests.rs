//! Tests for RetryingPool against in-memory and on-disk SQLite.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use sqlx::Row;

use crate::config::{CatalogName, SqlRetryConfig};
use crate::pool::RetryingPool;
use crate::retry::{classify, DbFailure, ErrorKind, RetryObserver, StatsObserver};

fn test_config() -> SqlRetryConfig {
    let mut cfg = SqlRetryConfig::default();
    cfg.retry.catalog = CatalogName::Sqlite;
    cfg.retry.backoff_unit_ms = 0;
    cfg
}

async fn seeded() -> (RetryingPool, Arc<StatsObserver>) {
    let stats = Arc::new(StatsObserver::new());
    let observer: Arc<dyn RetryObserver> = stats.clone();
    let db = RetryingPool::open_memory(&test_config())
        .await
        .unwrap()
        .with_observer(observer);
    db.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
         INSERT INTO users (name) VALUES ('ada'), ('grace');",
    )
    .await
    .unwrap();
    (db, stats)
}

#[tokio::test]
async fn call_shapes_return_results() {
    let (db, stats) = seeded().await;

    let rows = db.fetch_all("SELECT id, name FROM users ORDER BY id").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<String, _>("name"), "ada");

    let count: i64 = db.fetch_scalar("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(count, 2);

    let one = db.fetch_one("SELECT name FROM users WHERE id = 2").await.unwrap();
    assert_eq!(one.get::<String, _>(0), "grace");

    let none = db
        .fetch_optional("SELECT name FROM users WHERE id = 99")
        .await
        .unwrap();
    assert!(none.is_none());

    let affected = db
        .execute("UPDATE users SET name = upper(name)")
        .await
        .unwrap();
    assert_eq!(affected, 2);

    assert_eq!(stats.retries(), 0);
}

#[tokio::test]
async fn fetch_sets_reads_every_set() {
    let (db, _) = seeded().await;
    let sets = db
        .fetch_sets(&["SELECT id FROM users", "SELECT name FROM users WHERE id = 1"])
        .await
        .unwrap();
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].len(), 2);
    assert_eq!(sets[1].len(), 1);
}

#[tokio::test]
async fn invalid_column_is_not_retried() {
    let (db, stats) = seeded().await;
    let Err(err) = db.fetch_all("SELECT nope FROM users").await else {
        panic!("unknown column should fail");
    };

    assert!(matches!(err, sqlx::Error::Database(_)));
    assert!(!err.is_timeout());
    assert_eq!(
        classify(db.executor().policy().classifier().catalog(), &err),
        ErrorKind::Other
    );
    assert_eq!(stats.retries(), 0);
}

#[tokio::test]
async fn constraint_violation_is_not_retried() {
    let (db, stats) = seeded().await;
    let calls = AtomicU32::new(0);
    let err = db
        .run(|pool| {
            calls.fetch_add(1, Ordering::SeqCst);
            sqlx::query("INSERT INTO users (name) VALUES (?1)")
                .bind("ada")
                .execute(pool)
        })
        .await
        .unwrap_err();

    assert!(err.error_code().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.retries(), 0);
}

#[tokio::test]
async fn failed_batch_leaves_no_partial_writes() {
    let (db, stats) = seeded().await;
    let err = db
        .execute_batch(
            "INSERT INTO users (name) VALUES ('linus');
             INSERT INTO users (name) VALUES ('ada');",
        )
        .await
        .unwrap_err();

    assert!(err.error_code().is_some());
    assert_eq!(stats.retries(), 0);
    let count: i64 = db.fetch_scalar("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(count, 2);
    let linus: Option<i64> = db
        .run(|pool| {
            sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE name = 'linus'")
                .fetch_optional(pool)
        })
        .await
        .unwrap();
    assert!(linus.is_none());
}

#[tokio::test]
async fn failed_set_read_returns_connection_clean() {
    let (db, _) = seeded().await;
    let Err(err) = db
        .fetch_sets(&["SELECT id FROM users", "SELECT nope FROM users"])
        .await
    else {
        panic!("second set should fail");
    };
    assert!(matches!(err, sqlx::Error::Database(_)));

    // The single connection must not be left inside the aborted transaction.
    let affected = db
        .execute_batch("INSERT INTO users (name) VALUES ('linus');")
        .await
        .unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn row_not_found_is_not_retried() {
    let (db, stats) = seeded().await;
    let Err(err) = db.fetch_one("SELECT name FROM users WHERE id = 42").await else {
        panic!("missing row should fail");
    };
    assert!(matches!(err, sqlx::Error::RowNotFound));
    assert_eq!(stats.retries(), 0);
}

#[tokio::test]
async fn pool_timeout_is_retried_then_succeeds() {
    let (db, stats) = seeded().await;
    let calls = AtomicU32::new(0);
    let name: String = db
        .run(|pool| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    return Err(sqlx::Error::PoolTimedOut);
                }
                sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = ?1")
                    .bind(1_i64)
                    .fetch_one(pool)
                    .await
            }
        })
        .await
        .unwrap();

    assert_eq!(name, "ada");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(stats.retries(), 2);
}

#[tokio::test]
async fn exhausted_pool_timeout_propagates_original_error() {
    let (db, stats) = seeded().await;
    let calls = AtomicU32::new(0);
    let err = db
        .run(|_pool| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(sqlx::Error::PoolTimedOut) }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, sqlx::Error::PoolTimedOut));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(stats.retries(), 3);
}

#[tokio::test]
async fn open_at_creates_file_and_acquires() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested dir").join("app.db");
    let db = RetryingPool::open_at(&path, &test_config()).await.unwrap();

    let mut conn = db.acquire().await.unwrap();
    let one: i64 = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(one, 1);
    drop(conn);

    db.close().await;
    assert!(path.exists());
}
